fn end_to_end() {}
