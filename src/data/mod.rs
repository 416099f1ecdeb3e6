mod envelope_io;

pub use envelope_io::load_envelope;
