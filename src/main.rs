fn main() {
    ddl::cli::run();
}
