fn main() -> std::process::ExitCode {
    vault_bookmarker_lib::run()
}
