//! AI copywriting boundary for deal titles and descriptions.
//!
//! The real content generator (vision + LLM) is an external collaborator;
//! this seam only defines what the marketplace consumes. The bundled
//! [`MockContentGenerator`] produces deterministic placeholder copy.

/// AI-generated title and description for a deal.
#[derive(Debug, Clone)]
pub struct GeneratedCopy {
    /// Generated title.
    pub title: String,
    /// Generated description.
    pub description: String,
}

/// External AI copywriting collaborator.
pub trait ContentGenerator: Send + Sync + std::fmt::Debug {
    /// Produces AI copy from the vendor's own title and optional
    /// description.
    fn generate(&self, vendor_title: &str, vendor_description: Option<&str>) -> GeneratedCopy;
}

/// Deterministic stand-in for the AI content service.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockContentGenerator;

impl MockContentGenerator {
    /// Creates a new mock generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ContentGenerator for MockContentGenerator {
    fn generate(&self, vendor_title: &str, vendor_description: Option<&str>) -> GeneratedCopy {
        GeneratedCopy {
            title: format!("AI: {vendor_title}"),
            description: format!(
                "AI generated: {}",
                vendor_description.unwrap_or("Great offer!")
            ),
        }
    }
}
