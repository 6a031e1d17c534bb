mod utils;
mod utils_tests;

#[cfg(test)]
mod tests {
    fn smoke() {}
}
