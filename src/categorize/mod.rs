//! Category catalog and nearest-category batch assignment.
//!
//! Every document in the corpus is classified once at startup against a
//! fixed catalog of category descriptions: the document's embedding is
//! compared to each category's description embedding and the argmax wins.
//! Exact ties resolve to the lowest catalog index so the assignment is
//! deterministic for identical inputs.

use crate::models::Category;
use crate::ranking::cosine_similarity;

/// The fixed bioscience category catalog.
///
/// Names and description texts come from the service configuration; the
/// enumeration order is load-bearing: it defines tie-breaking and the
/// column order offered to the temporal aggregator.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "Microgravity Effects",
            "Experiments on gravity, weightlessness, and their effects on biological systems \
             including physiological, cellular, and molecular responses to altered gravity.",
        ),
        Category::new(
            "Radiation Biology",
            "Studies of cosmic radiation, particle exposure, and radiation effects on cells, \
             organisms, and humans in space environments.",
        ),
        Category::new(
            "Plant & Microbial Biology",
            "Plant growth, seeds, germination, agriculture, and microbial biology in space \
             including microbiome studies and microbial adaptation to space conditions.",
        ),
        Category::new(
            "Human Physiology & Behavior",
            "Human health and physiological studies, including cardiovascular, musculoskeletal, \
             cognitive, and behavioral experiments on astronauts and crew.",
        ),
        Category::new(
            "Molecular & Cell Biology",
            "Molecular, cellular, proteomic, genomic, and omics studies, covering gene \
             expression, proteins, DNA, RNA, and cellular mechanisms in space.",
        ),
        Category::new(
            "Space Medicine",
            "Medical interventions, therapies, treatments, and countermeasures for health risks \
             associated with spaceflight and prolonged exposure to microgravity or radiation.",
        ),
        Category::new(
            "Life Support & Environment",
            "Studies on air, water, waste management, and environmental control systems for \
             sustaining life in spacecraft or habitats.",
        ),
        Category::new(
            "Space Systems & Instrumentation",
            "Development and testing of devices, instruments, hardware, and experimental \
             technologies used in space research and bioscience experiments.",
        ),
        Category::new(
            "Synthetic Biology & Tissue Engineering",
            "Tissue growth and synthetic biology in space Engineering tissues, organoids, or \
             synthetic biological systems, including growth and manipulation of biological \
             samples in space.",
        ),
    ]
}

/// Assign each document embedding its nearest category.
///
/// # Arguments
/// * `document_embeddings` - One embedding per document, index-aligned
/// * `category_embeddings` - One embedding per catalog category, in catalog order
///
/// # Returns
/// For each document, the index of the best-scoring category. Ties resolve
/// to the lowest category index. Documents with zero-norm embeddings (no
/// usable text) score 0.0 against everything and therefore land on the
/// first category, an accepted approximation rather than an error.
///
/// # Panics
/// Panics if the category matrix is empty; the catalog is static and
/// non-empty by construction.
pub fn assign_categories(
    document_embeddings: &[Vec<f32>],
    category_embeddings: &[Vec<f32>],
) -> Vec<usize> {
    assert!(
        !category_embeddings.is_empty(),
        "category catalog must not be empty"
    );

    document_embeddings
        .iter()
        .map(|doc| nearest_category(doc, category_embeddings))
        .collect()
}

/// Index of the best-scoring category for a single embedding.
fn nearest_category(embedding: &[f32], category_embeddings: &[Vec<f32>]) -> usize {
    let mut best_index = 0;
    let mut best_score = f32::NEG_INFINITY;

    for (index, category) in category_embeddings.iter().enumerate() {
        let score = cosine_similarity(embedding, category);
        // Strictly greater keeps the first category on exact ties.
        if score > best_score {
            best_score = score;
            best_index = index;
        }
    }

    best_index
}
