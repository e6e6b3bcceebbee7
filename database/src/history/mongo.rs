use async_trait::async_trait;
use bson::doc;
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use types::{Dice, GameHistoryRecord, GameId, Winner};

use super::HistoryStore;
use crate::{DatabaseError, HistoryConfig};

pub const HISTORY_COLLECTION: &str = "game_history";

fn document_err(e: mongodb::error::Error) -> DatabaseError {
    DatabaseError::Document(e.to_string())
}

/// Stored shape of a history record. Timestamps are BSON dates so the
/// collection sorts chronologically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryDocument {
    id: String,
    timestamp: bson::DateTime,
    winner: Winner,
    player_score: i32,
    computer_score: i32,
    player_dice: Vec<i32>,
    computer_dice: Vec<i32>,
}

impl From<&GameHistoryRecord> for HistoryDocument {
    fn from(record: &GameHistoryRecord) -> Self {
        Self {
            id: record.id.to_string(),
            timestamp: bson::DateTime::from_chrono(record.timestamp),
            winner: record.winner,
            player_score: i32::from(record.player_score),
            computer_score: i32::from(record.computer_score),
            player_dice: record.player_dice.iter().map(|&d| i32::from(d)).collect(),
            computer_dice: record.computer_dice.iter().map(|&d| i32::from(d)).collect(),
        }
    }
}

fn dice_from_document(id: &str, values: &[i32]) -> Result<Dice, DatabaseError> {
    let malformed = || DatabaseError::Document(format!("history {id} has malformed dice {values:?}"));
    match values {
        [a, b] => Ok([
            u8::try_from(*a).map_err(|_| malformed())?,
            u8::try_from(*b).map_err(|_| malformed())?,
        ]),
        _ => Err(malformed()),
    }
}

fn score_from_document(id: &str, value: i32) -> Result<u8, DatabaseError> {
    u8::try_from(value)
        .map_err(|_| DatabaseError::Document(format!("history {id} has malformed score {value}")))
}

impl HistoryDocument {
    fn into_record(self) -> Result<GameHistoryRecord, DatabaseError> {
        Ok(GameHistoryRecord {
            player_score: score_from_document(&self.id, self.player_score)?,
            computer_score: score_from_document(&self.id, self.computer_score)?,
            player_dice: dice_from_document(&self.id, &self.player_dice)?,
            computer_dice: dice_from_document(&self.id, &self.computer_dice)?,
            timestamp: self.timestamp.to_chrono(),
            winner: self.winner,
            id: GameId::from(self.id),
        })
    }
}

pub struct MongoHistoryStore {
    client: Client,
    collection: Collection<HistoryDocument>,
}

impl MongoHistoryStore {
    /// Connects and pings the server so an unreachable store fails here rather than on first use.
    pub async fn connect(config: &HistoryConfig) -> Result<Self, DatabaseError> {
        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        let database = client.database(&config.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        let collection = database.collection::<HistoryDocument>(HISTORY_COLLECTION);
        collection
            .create_index(IndexModel::builder().keys(doc! { "timestamp": -1 }).build())
            .await
            .map_err(document_err)?;

        tracing::info!(
            "Connected to history store {}/{}",
            config.database,
            HISTORY_COLLECTION
        );
        Ok(Self { client, collection })
    }
}

#[async_trait]
impl HistoryStore for MongoHistoryStore {
    async fn append(&self, record: &GameHistoryRecord) -> Result<(), DatabaseError> {
        self.collection
            .insert_one(HistoryDocument::from(record))
            .await
            .map_err(document_err)?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<GameHistoryRecord>, DatabaseError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "timestamp": -1 })
            .limit(limit)
            .await
            .map_err(document_err)?;

        let mut records = Vec::new();
        while cursor.advance().await.map_err(document_err)? {
            let document = cursor.deserialize_current().map_err(document_err)?;
            records.push(document.into_record()?);
        }
        Ok(records)
    }

    async fn close(&self) -> Result<(), DatabaseError> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}
