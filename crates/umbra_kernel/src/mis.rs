//! Multiple importance sampling weights.
//!
//! Arguments are the pdfs of each strategy already multiplied by its
//! number of samples.

/// Power heuristic with exponent two.
#[inline]
pub fn squared_heuristic(pdf_a: f32, pdf_b: f32) -> f32 {
    let a = pdf_a * pdf_a;
    let b = pdf_b * pdf_b;
    a / (a + b)
}

#[inline]
pub fn balance_heuristic(pdf_a: f32, pdf_b: f32) -> f32 {
    pdf_a / (pdf_a + pdf_b)
}
