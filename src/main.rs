fn main() {
    kinfolk::cli::run();
}
