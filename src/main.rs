use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    revchat::cli::main()
}
