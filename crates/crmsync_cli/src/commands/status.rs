use crmsync::db;
use crmsync::sink::query;

/// Print per-resource row counts for the destination store.
pub(crate) async fn handle_status(database_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;
    let counts = query::counts(&db).await?;

    println!("{:<16} {:>10}", "resource", "records");
    let mut total = 0u64;
    for (resource, count) in counts {
        println!("{:<16} {:>10}", resource.to_string(), count);
        total += count;
    }
    println!("{:<16} {:>10}", "total", total);

    Ok(())
}
