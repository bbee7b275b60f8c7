fn main() -> Result<(), Box<dyn std::error::Error>> {
    linga::cli::main()
}
