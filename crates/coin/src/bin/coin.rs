//! coin - plain-text double-entry accounting.

fn main() -> std::process::ExitCode {
    coin::cli::main()
}
