use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use crate::{
    error::AppResult,
    graph::MatchGraph,
    models::{Menu, Rating, UserId},
    services::discovery,
};

/// One row of the order history dataset; other columns are ignored
#[derive(Debug, Deserialize)]
struct OrderRow {
    customer_id: u32,
    restaurant_name: String,
    cuisine_type: String,
    rating: String,
}

/// Summary of an ingestion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub rows: usize,
    pub users: usize,
    pub restaurants: usize,
    pub matches: usize,
}

/// Builds the match graph from an order history CSV file
pub fn ingest_csv(path: impl AsRef<Path>) -> AppResult<(MatchGraph, IngestionReport)> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "Ingesting order history");

    let reader = csv::Reader::from_path(path)?;
    ingest_rows(reader)
}

/// Builds the match graph from CSV data with a header row.
///
/// Orders are recorded in file order, so the second row for a
/// user/restaurant/cuisine combination sets its repeated rating. One batch
/// discovery pass runs once every row is in.
pub fn ingest_reader<R: Read>(input: R) -> AppResult<(MatchGraph, IngestionReport)> {
    ingest_rows(csv::Reader::from_reader(input))
}

fn ingest_rows<R: Read>(mut reader: csv::Reader<R>) -> AppResult<(MatchGraph, IngestionReport)> {
    let mut orders: Vec<(UserId, String, String, Rating)> = Vec::new();
    let mut menu = Menu::new();

    for row in reader.deserialize() {
        let row: OrderRow = row?;
        let rating = Rating::from_dataset(&row.rating)?;
        menu.add(&row.restaurant_name, &row.cuisine_type);
        orders.push((
            UserId::new(row.customer_id),
            row.restaurant_name,
            row.cuisine_type,
            rating,
        ));
    }

    let mut graph = MatchGraph::with_menu(menu);
    for (user, restaurant, cuisine, rating) in &orders {
        graph.add_vertex(*user);
        graph.record_order(*user, restaurant, cuisine, *rating)?;
    }

    let matches = discovery::discover_all(&mut graph);
    let report = IngestionReport {
        rows: orders.len(),
        users: graph.len(),
        restaurants: graph.menu().len(),
        matches,
    };

    tracing::info!(
        rows = report.rows,
        users = report.users,
        restaurants = report.restaurants,
        matches = report.matches,
        "Order history ingested"
    );
    Ok((graph, report))
}
