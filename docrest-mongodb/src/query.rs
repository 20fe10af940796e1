//! Mapping of docrest find options onto the MongoDB driver's options.

use bson::{Document, doc};
use mongodb::options::FindOptions as MongoFindOptions;

use docrest_core::query::{FindOptions, Sort, SortDirection};


/// Builds the driver's sort document: `1` ascending, `-1` descending.
pub(crate) fn sort_document(sort: &Sort) -> Document {
    doc! {
        sort.field.clone(): match sort.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

pub(crate) fn find_options(options: &FindOptions) -> MongoFindOptions {
    let mut mongo_options = MongoFindOptions::default();

    if let Some(limit) = options.limit {
        mongo_options.limit = Some(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    if let Some(skip) = options.skip {
        mongo_options.skip = Some(skip);
    }
    if let Some(sort) = &options.sort {
        mongo_options.sort = Some(sort_document(sort));
    }

    mongo_options
}
