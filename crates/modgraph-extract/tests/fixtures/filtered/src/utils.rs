pub fn shave(input: &str) -> String {
    input.trim().to_string()
}
