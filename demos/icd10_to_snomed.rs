//! ICD10CM -> SNOMED crosswalk over a handful of in-memory Athena rows.
//!
//! Run with: cargo run --example icd10_to_snomed

use cwmed_io::write_crosswalk_to;
use cwmed_io::TableFormat;
use cwmed_vocab::{CrosswalkResolver, Table};

fn main() -> anyhow::Result<()> {
    let concepts = Table::from_rows(
        ["concept_id", "concept_name", "vocabulary_id", "concept_code"],
        [
            ["35205417", "Other intestinal Escherichia coli infections", "ICD10CM", "A04.4"],
            ["192815", "Intestinal infection due to E. coli", "SNOMED", "111839008"],
            ["45548980", "Enterocolitis due to Clostridium difficile", "ICD10CM", "A04.7"],
        ],
    );
    let relationships = Table::from_rows(
        ["concept_id_1", "concept_id_2", "relationship_id"],
        [["35205417", "192815", "Maps to"]],
    );
    let source = Table::from_rows(["icd10"], [["A04.4"], ["A04.7"], ["C78.7"]]);

    let resolver = CrosswalkResolver::from_tables(
        &source,
        &concepts,
        &relationships,
        "ICD10CM",
        "SNOMED",
        "icd10",
    )?;

    println!("crosswalk:");
    write_crosswalk_to(std::io::stdout(), &resolver.header(), resolver.rows(), TableFormat::csv())?;

    println!("\nfailed mappings:");
    write_crosswalk_to(
        std::io::stdout(),
        &resolver.header(),
        resolver.failed_rows(),
        TableFormat::csv(),
    )?;
    Ok(())
}
