use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::countdown::{calculate_time_left, TimeLeft};

/// Genres hidden from every show list: News, Reality and Talk.
pub const FILTERED_GENRE_IDS: [u64; 3] = [10763, 10764, 10767];

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TvShow {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_air_date: String,
    #[serde(default)]
    pub next_episode_to_air: Option<Episode>,
    #[serde(default)]
    pub last_episode_to_air: Option<Episode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub number_of_seasons: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub networks: Vec<Network>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_by: Vec<Creator>,
}

impl TvShow {
    /// Whether the show belongs to a genre hidden from lists.
    pub fn is_filtered_genre(&self) -> bool {
        self.genres
            .iter()
            .any(|genre| FILTERED_GENRE_IDS.contains(&genre.id))
    }

    /// Air date of the next scheduled episode, if one is announced.
    pub fn next_air_date(&self) -> Option<&str> {
        self.next_episode_to_air
            .as_ref()
            .map(|episode| episode.air_date.as_str())
            .filter(|date| !date.is_empty())
    }

    /// Countdown to the next episode.
    pub fn time_until_next_episode(&self, now: DateTime<Utc>) -> Option<TimeLeft> {
        calculate_time_left(self.next_air_date()?, now)
    }

    /// Year of the first air date, for display.
    pub fn first_air_year(&self) -> Option<&str> {
        self.first_air_date.get(..4).filter(|year| year.len() == 4)
    }

    pub fn genre_names(&self) -> String {
        self.genres
            .iter()
            .map(|genre| genre.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Episode {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub air_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub episode_number: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub season_number: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub runtime: u32,
}

impl Episode {
    /// Short code like `S02E05`.
    pub fn code(&self) -> String {
        format!("S{:02}E{:02}", self.season_number, self.episode_number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Season {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub air_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub season_number: u32,
    /// Derived from `episodes` when the API omits it.
    #[serde(default)]
    pub episode_count: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub episodes: Vec<Episode>,
}

impl Season {
    pub(crate) fn with_episode_count(mut self) -> Self {
        self.episode_count = self.episodes.len();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Genre {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Network {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Creator {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Paged list envelope returned by list and search endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ShowListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<TvShow>,
}
