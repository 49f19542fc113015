//! Test data builders
//!
//! The sample catalog is small on purpose: every search test can reason
//! about the exact expected result set.

use super::constants::*;
use serde_json::{json, Value};

/// Four shows with overlapping titles, directors and countries.
pub fn sample_shows() -> Vec<Value> {
    vec![
        json!({
            "show_id": SHOW_1_ID,
            "type": "TV Show",
            "title": "Kota Factory",
            "director": null,
            "cast": "Mayur More, Jitendra Kumar",
            "country": "India",
            "date_added": "September 24, 2021",
            "release_year": 2021,
            "rating": "TV-MA",
            "duration": "2 Seasons",
            "listed_in": "International TV Shows, Romantic TV Shows, TV Comedies",
            "description": "In a city of coaching centers known to train India's finest collegiate minds."
        }),
        json!({
            "show_id": SHOW_2_ID,
            "type": "Movie",
            "title": "The Ring",
            "director": "Gore Verbinski",
            "cast": "Naomi Watts",
            "country": "United States",
            "date_added": "January 1, 2020",
            "release_year": 2002,
            "rating": "PG-13",
            "duration": "115 min",
            "listed_in": "Horror Movies",
            "description": "A journalist investigates a cursed videotape."
        }),
        json!({
            "show_id": SHOW_3_ID,
            "type": "Movie",
            "title": "Ringu",
            "director": "Hideo Nakata",
            "cast": "Nanako Matsushima",
            "country": "Japan",
            "date_added": "October 1, 2019",
            "release_year": 1998,
            "rating": "TV-14",
            "duration": "96 min",
            "listed_in": "Horror Movies, International Movies",
            "description": "A reporter races to unravel the mystery of a cursed videotape."
        }),
        json!({
            "show_id": SHOW_4_ID,
            "type": "Movie",
            "title": "Rope",
            "director": "Alfred Hitchcock",
            "cast": "James Stewart",
            "country": "United States",
            "date_added": "March 3, 2018",
            "release_year": 1948,
            "rating": "PG",
            "duration": "80 min",
            "listed_in": "Classic Movies, Thrillers",
            "description": "Two friends try to commit the perfect murder."
        }),
    ]
}

/// A minimal show without id, so the server assigns one.
#[allow(dead_code)]
pub fn numbered_show(n: usize) -> Value {
    json!({
        "type": "Movie",
        "title": format!("Numbered Show {}", n),
        "release_year": 2000 + n as i64
    })
}
