//! CSV loaders for the ratings and books sources
//!
//! Columns are matched by header name. Unknown columns are ignored; a missing
//! required column or an unparsable row aborts the load.

use crate::error::{RecommendError, Result};
use crate::models::{Book, ItemId, Rating, UserId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const RATING_COLUMNS: [&str; 3] = ["User-ID", "ISBN", "Book-Rating"];
const BOOK_COLUMNS: [&str; 3] = ["ISBN", "Book-Title", "Book-Author"];

#[derive(Debug, Deserialize)]
struct RatingRecord {
    #[serde(rename = "User-ID")]
    user_id: String,
    #[serde(rename = "ISBN")]
    isbn: String,
    #[serde(rename = "Book-Rating")]
    rating: f64,
}

#[derive(Debug, Deserialize)]
struct BookRecord {
    #[serde(rename = "ISBN")]
    isbn: String,
    #[serde(rename = "Book-Title")]
    title: String,
    #[serde(rename = "Book-Author")]
    author: String,
}

pub fn load_ratings<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Vec<Rating>> {
    let path = path.as_ref();
    let reader = open(path, delimiter)?;
    read_ratings(reader, &path.display().to_string())
}

pub fn load_books<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Vec<Book>> {
    let path = path.as_ref();
    let reader = open(path, delimiter)?;
    read_books(reader, &path.display().to_string())
}

/// Parse ratings from any reader; `source` names it in error messages
pub fn ratings_from_reader<R: Read>(rdr: R, source: &str, delimiter: u8) -> Result<Vec<Rating>> {
    read_ratings(builder(delimiter).from_reader(rdr), source)
}

pub fn books_from_reader<R: Read>(rdr: R, source: &str, delimiter: u8) -> Result<Vec<Book>> {
    read_books(builder(delimiter).from_reader(rdr), source)
}

fn read_ratings<R: Read>(reader: csv::Reader<R>, source: &str) -> Result<Vec<Rating>> {
    let records: Vec<(u64, RatingRecord)> = read_records(reader, source, &RATING_COLUMNS)?;

    let mut ratings = Vec::with_capacity(records.len());
    for (line, r) in records {
        if !r.rating.is_finite() {
            return Err(RecommendError::MalformedRecord {
                path: source.to_string(),
                line,
                message: format!("rating must be a finite number, got {}", r.rating),
            });
        }
        ratings.push(Rating {
            user_id: UserId::new(r.user_id),
            item_id: ItemId::new(r.isbn),
            value: r.rating,
        });
    }

    debug!(source, rows = ratings.len(), "Loaded ratings");
    Ok(ratings)
}

fn read_books<R: Read>(reader: csv::Reader<R>, source: &str) -> Result<Vec<Book>> {
    let records: Vec<(u64, BookRecord)> = read_records(reader, source, &BOOK_COLUMNS)?;

    let books: Vec<Book> = records
        .into_iter()
        .map(|(_, r)| Book {
            item_id: ItemId::new(r.isbn),
            title: r.title,
            author: r.author,
        })
        .collect();

    debug!(source, rows = books.len(), "Loaded books");
    Ok(books)
}

fn builder(delimiter: u8) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.delimiter(delimiter).trim(csv::Trim::All);
    builder
}

fn open(path: &Path, delimiter: u8) -> Result<csv::Reader<std::fs::File>> {
    builder(delimiter)
        .from_path(path)
        .map_err(|e| RecommendError::DataLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Deserialize every row by header name, paired with its 1-based line number
fn read_records<R: Read, T: DeserializeOwned>(
    mut reader: csv::Reader<R>,
    source: &str,
    required: &[&str],
) -> Result<Vec<(u64, T)>> {
    let headers = reader
        .headers()
        .map_err(|e| csv_error(e, source))?
        .clone();

    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(RecommendError::MalformedRecord {
                path: source.to_string(),
                line: 1,
                message: format!("missing column `{}`", column),
            });
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| csv_error(e, source))?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let record = row
            .deserialize(Some(&headers))
            .map_err(|e| RecommendError::MalformedRecord {
                path: source.to_string(),
                line,
                message: e.to_string(),
            })?;
        records.push((line, record));
    }

    Ok(records)
}

fn csv_error(err: csv::Error, source: &str) -> RecommendError {
    if err.is_io_error() {
        return RecommendError::DataLoad {
            path: source.to_string(),
            message: err.to_string(),
        };
    }

    let line = err.position().map(|p| p.line()).unwrap_or(0);
    RecommendError::MalformedRecord {
        path: source.to_string(),
        line,
        message: err.to_string(),
    }
}
