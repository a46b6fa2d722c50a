fn main() -> Result<(), Box<dyn std::error::Error>> {
    sentiment_oracle::cli::main()
}
