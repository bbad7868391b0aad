//! Basic usage example for the Digital Archive client.
//!
//! Searches for documents about the Cuban Missile Crisis, then hydrates the
//! first match together with its transcripts and collections.

use digital_archive::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let archive = Archive::new()?;

    let range = archive.date_range().await?;
    println!("Archive holds documents from {} to {}\n", range.begin, range.end);

    // Subjects are matched by name through the archive's term search
    let subjects = Subject::search(&archive, SearchFilters::new().with("name", "Cuban Missile Crisis"))
        .await?
        .into_vec();
    println!("Found {} matching subjects", subjects.len());

    let mut documents = Document::search(
        &archive,
        SearchFilters::new()
            .related("subjects", &subjects)
            .languages(["rus"])
            .with("start_date", "19621001")
            .with("end_date", "19621231")
            .items_per_page(25),
    )
    .await?;
    println!("Found {} documents\n", documents.count());

    for doc in documents.all().await?.iter().take(5) {
        println!("  [{}] {} ({})", doc.id, doc.title, doc.frontend_doc_date);
    }

    if let Some(doc) = documents.first() {
        let mut doc = doc.clone();
        doc.hydrate_recursive(&archive).await?;

        println!("\n{}", doc.title);
        if let Some(transcripts) = doc.transcripts.value() {
            for transcript in transcripts {
                if let Some(html) = transcript.content.html.value() {
                    println!("Transcript ({} characters)", html.len());
                }
            }
        }
        if let Some(collections) = doc.collections.value() {
            for collection in collections {
                println!("Collection: {}", collection.name);
            }
        }
    }

    Ok(())
}
