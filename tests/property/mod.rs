// Property-based tests harness
mod tagging {
    include!("tagging.rs");
}
mod reader {
    include!("reader.rs");
}
mod emission {
    include!("emission.rs");
}
