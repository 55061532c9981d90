//! Reservation code generation

use rand::Rng;

use crate::domain::reservation::CodeGenerator;

/// Uniformly random 8-digit numeric codes (leading zeros kept).
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let n: u32 = rand::thread_rng().gen_range(0..100_000_000);
        format!("{:08}", n)
    }
}
