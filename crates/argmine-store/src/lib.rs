//! Argmine Storage Layer
//!
//! Implements the [`GraphStore`] trait on SQLite.
//!
//! # Architecture
//!
//! - One table per entity, keyed by content identifier
//! - Relations keyed by their ordered `(source, target)` pair
//! - Upserts are `INSERT ... ON CONFLICT DO NOTHING` followed by a re-fetch,
//!   so two writers racing on identical content end with one row
//!
//! # Examples
//!
//! ```no_run
//! use argmine_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for graph operations
//! ```

#![warn(missing_docs)]

use argmine_domain::identity::content_key;
use argmine_domain::traits::{GraphStore, Upsert};
use argmine_domain::{
    Author, Component, ComponentLabel, Debate, DebateGraph, Identifier, Relation, RelationLabel,
    Statement, StatementRole,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// How long a writer waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const STATEMENT_COLUMNS: &str = "identifier, text, debate_id, author_id, role, \
     classification_score, related_to, relation_score, manual_annotation";

const COMPONENT_COLUMNS: &str = "c.identifier, c.statement_id, c.span_start, c.span_end, \
     c.label, c.score, c.fragment, c.manual_annotation";

const RELATION_COLUMNS: &str = "r.source_id, r.target_id, r.label, r.score, r.manual_annotation";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-based implementation of GraphStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance; several instances may share one database file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use argmine_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("argmine.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Number of rows in each entity table: (statements, components, relations)
    pub fn counts(&self) -> Result<(usize, usize, usize), StoreError> {
        let count = |table: &str| -> Result<usize, StoreError> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(n as usize)
        };
        Ok((count("statements")?, count("components")?, count("relations")?))
    }

    fn get_debate(&self, id: &Identifier) -> Result<Option<Debate>, StoreError> {
        let debate = self
            .conn
            .query_row(
                "SELECT identifier, name, source FROM debates WHERE identifier = ?1",
                params![id.as_str()],
                row_to_debate,
            )
            .optional()?;
        Ok(debate)
    }

    fn get_author(&self, id: &Identifier) -> Result<Option<Author>, StoreError> {
        let author = self
            .conn
            .query_row(
                "SELECT identifier, name FROM authors WHERE identifier = ?1",
                params![id.as_str()],
                row_to_author,
            )
            .optional()?;
        Ok(author)
    }

    fn get_relation(
        &self,
        source: &Identifier,
        target: &Identifier,
    ) -> Result<Option<Relation>, StoreError> {
        let relation = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM relations r WHERE r.source_id = ?1 AND r.target_id = ?2",
                    RELATION_COLUMNS
                ),
                params![source.as_str(), target.as_str()],
                row_to_relation,
            )
            .optional()?;
        Ok(relation)
    }

    fn statements_for_debate(&self, id: &Identifier) -> Result<Vec<Statement>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM statements WHERE debate_id = ?1 ORDER BY rowid",
            STATEMENT_COLUMNS
        ))?;
        let statements = stmt
            .query_map(params![id.as_str()], row_to_statement)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(statements)
    }

    fn components_for_debate(&self, id: &Identifier) -> Result<Vec<Component>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM components c
             JOIN statements s ON s.identifier = c.statement_id
             WHERE s.debate_id = ?1
             ORDER BY s.rowid, c.span_start, c.span_end, c.rowid",
            COMPONENT_COLUMNS
        ))?;
        let components = stmt
            .query_map(params![id.as_str()], row_to_component)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(components)
    }

    fn relations_for_debate(&self, id: &Identifier) -> Result<Vec<Relation>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM relations r
             WHERE r.source_id IN (
                 SELECT c.identifier FROM components c
                 JOIN statements s ON s.identifier = c.statement_id
                 WHERE s.debate_id = ?1)
             OR r.target_id IN (
                 SELECT c.identifier FROM components c
                 JOIN statements s ON s.identifier = c.statement_id
                 WHERE s.debate_id = ?1)
             ORDER BY r.id",
            RELATION_COLUMNS
        ))?;
        let relations = stmt
            .query_map(params![id.as_str()], row_to_relation)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(relations)
    }
}

/// Compare a re-fetched record against the one that lost the insert race
fn settle<T>(existing: T, existing_key: String, attempted_key: String) -> Upsert<T> {
    if existing_key == attempted_key {
        Upsert::Existing(existing)
    } else {
        Upsert::Collision(existing)
    }
}

impl GraphStore for SqliteStore {
    type Error = StoreError;

    fn find_debate(&self, key: &str) -> Result<Option<Debate>, Self::Error> {
        let debate = self
            .conn
            .query_row(
                "SELECT identifier, name, source FROM debates
                 WHERE identifier = ?1 OR name = ?1
                 ORDER BY identifier = ?1 DESC LIMIT 1",
                params![key],
                row_to_debate,
            )
            .optional()?;
        Ok(debate)
    }

    fn upsert_debate(&mut self, debate: Debate) -> Result<Upsert<Debate>, Self::Error> {
        let key = content_key(&[debate.name.as_str()]);
        let inserted = self.conn.execute(
            "INSERT INTO debates (identifier, content_key, name, source)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT DO NOTHING",
            params![debate.identifier.as_str(), &key, &debate.name, &debate.source],
        )?;
        if inserted == 1 {
            return Ok(Upsert::Created(debate));
        }

        match self.get_debate(&debate.identifier)? {
            Some(existing) => {
                let existing_key = content_key(&[existing.name.as_str()]);
                Ok(settle(existing, existing_key, key))
            }
            // the name is taken under another identifier
            None => self
                .find_debate(&debate.name)?
                .map(Upsert::Collision)
                .ok_or_else(|| StoreError::InvalidData(format!("debate '{}' vanished", debate.name))),
        }
    }

    fn find_author(&self, key: &str) -> Result<Option<Author>, Self::Error> {
        let author = self
            .conn
            .query_row(
                "SELECT identifier, name FROM authors
                 WHERE identifier = ?1 OR name = ?1
                 ORDER BY identifier = ?1 DESC LIMIT 1",
                params![key],
                row_to_author,
            )
            .optional()?;
        Ok(author)
    }

    fn upsert_author(&mut self, author: Author) -> Result<Upsert<Author>, Self::Error> {
        let key = content_key(&[author.name.as_str()]);
        let inserted = self.conn.execute(
            "INSERT INTO authors (identifier, content_key, name)
             VALUES (?1, ?2, ?3)
             ON CONFLICT DO NOTHING",
            params![author.identifier.as_str(), &key, &author.name],
        )?;
        if inserted == 1 {
            return Ok(Upsert::Created(author));
        }

        match self.get_author(&author.identifier)? {
            Some(existing) => {
                let existing_key = content_key(&[existing.name.as_str()]);
                Ok(settle(existing, existing_key, key))
            }
            None => self
                .find_author(&author.name)?
                .map(Upsert::Collision)
                .ok_or_else(|| StoreError::InvalidData(format!("author '{}' vanished", author.name))),
        }
    }

    fn upsert_statement(&mut self, statement: Statement) -> Result<Upsert<Statement>, Self::Error> {
        let key = statement.content_key();
        let inserted = self.conn.execute(
            "INSERT INTO statements (identifier, content_key, text, debate_id, author_id, role,
                 classification_score, related_to, relation_score, manual_annotation)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(identifier) DO NOTHING",
            params![
                statement.identifier.as_str(),
                &key,
                &statement.text,
                statement.debate.as_str(),
                statement.author.as_str(),
                statement.role.map(|role| role.as_str()),
                statement.classification_score,
                statement.related_to.as_ref().map(Identifier::as_str),
                statement.relation_score,
                statement.manual_annotation,
            ],
        )?;
        if inserted == 1 {
            return Ok(Upsert::Created(statement));
        }

        let existing = self.get_statement(&statement.identifier)?.ok_or_else(|| {
            StoreError::InvalidData(format!("statement {} vanished", statement.identifier))
        })?;
        let existing_key = existing.content_key();
        Ok(settle(existing, existing_key, key))
    }

    fn get_statement(&self, id: &Identifier) -> Result<Option<Statement>, Self::Error> {
        let statement = self
            .conn
            .query_row(
                &format!("SELECT {} FROM statements WHERE identifier = ?1", STATEMENT_COLUMNS),
                params![id.as_str()],
                row_to_statement,
            )
            .optional()?;
        Ok(statement)
    }

    fn set_classification(
        &mut self,
        id: &Identifier,
        role: StatementRole,
        score: f64,
    ) -> Result<bool, Self::Error> {
        let tx = self.conn.transaction()?;
        let previous = tx
            .query_row(
                "SELECT role FROM statements WHERE identifier = ?1 AND manual_annotation = 0",
                params![id.as_str()],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        let Some(previous) = previous else {
            return Ok(false);
        };
        let previous = previous.as_deref().and_then(StatementRole::parse);

        if previous == Some(role) {
            tx.execute(
                "UPDATE statements SET classification_score = ?2 WHERE identifier = ?1",
                params![id.as_str(), score],
            )?;
        } else {
            // a link only means something for the role it was scored under
            tx.execute(
                "UPDATE statements SET role = ?2, classification_score = ?3,
                     related_to = NULL, relation_score = NULL
                 WHERE identifier = ?1",
                params![id.as_str(), role.as_str(), score],
            )?;
            if previous == Some(StatementRole::Position) {
                tx.execute(
                    "UPDATE statements SET related_to = NULL, relation_score = NULL
                     WHERE related_to = ?1 AND manual_annotation = 0",
                    params![id.as_str()],
                )?;
            }
        }

        tx.commit()?;
        Ok(true)
    }

    fn set_link(
        &mut self,
        id: &Identifier,
        related_to: Option<&Identifier>,
        score: f64,
    ) -> Result<bool, Self::Error> {
        let updated = self.conn.execute(
            "UPDATE statements SET related_to = ?2, relation_score = ?3
             WHERE identifier = ?1 AND manual_annotation = 0",
            params![id.as_str(), related_to.map(Identifier::as_str), score],
        )?;
        Ok(updated == 1)
    }

    fn annotate_statement(
        &mut self,
        id: &Identifier,
        role: StatementRole,
        related_to: Option<&Identifier>,
    ) -> Result<bool, Self::Error> {
        let updated = self.conn.execute(
            "UPDATE statements SET role = ?2, classification_score = NULL,
                 related_to = ?3, relation_score = NULL, manual_annotation = 1
             WHERE identifier = ?1",
            params![id.as_str(), role.as_str(), related_to.map(Identifier::as_str)],
        )?;
        Ok(updated == 1)
    }

    fn upsert_component(&mut self, component: Component) -> Result<Upsert<Component>, Self::Error> {
        let key = component.content_key();
        let inserted = self.conn.execute(
            "INSERT INTO components (identifier, content_key, statement_id, span_start, span_end,
                 label, score, fragment, manual_annotation)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(identifier) DO NOTHING",
            params![
                component.identifier.as_str(),
                &key,
                component.statement.as_str(),
                component.start as i64,
                component.end as i64,
                component.label.code(),
                component.score,
                &component.fragment,
                component.manual_annotation,
            ],
        )?;
        if inserted == 1 {
            return Ok(Upsert::Created(component));
        }

        let existing = self.get_component(&component.identifier)?.ok_or_else(|| {
            StoreError::InvalidData(format!("component {} vanished", component.identifier))
        })?;
        let existing_key = existing.content_key();
        Ok(settle(existing, existing_key, key))
    }

    fn get_component(&self, id: &Identifier) -> Result<Option<Component>, Self::Error> {
        let component = self
            .conn
            .query_row(
                &format!("SELECT {} FROM components c WHERE c.identifier = ?1", COMPONENT_COLUMNS),
                params![id.as_str()],
                row_to_component,
            )
            .optional()?;
        Ok(component)
    }

    fn components_for_statement(&self, id: &Identifier) -> Result<Vec<Component>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM components c WHERE c.statement_id = ?1
             ORDER BY c.span_start, c.span_end, c.rowid",
            COMPONENT_COLUMNS
        ))?;
        let components = stmt
            .query_map(params![id.as_str()], row_to_component)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(components)
    }

    fn upsert_relation(&mut self, relation: Relation) -> Result<Upsert<Relation>, Self::Error> {
        let inserted = self.conn.execute(
            "INSERT INTO relations (source_id, target_id, label, score, manual_annotation)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(source_id, target_id) DO NOTHING",
            params![
                relation.source.as_str(),
                relation.target.as_str(),
                relation.label.code(),
                relation.score,
                relation.manual_annotation,
            ],
        )?;
        if inserted == 1 {
            return Ok(Upsert::Created(relation));
        }

        // an edge is identified by its endpoints alone, so any existing edge is the canonical one
        let existing = self
            .get_relation(&relation.source, &relation.target)?
            .ok_or_else(|| {
                StoreError::InvalidData(format!(
                    "relation {} -> {} vanished",
                    relation.source, relation.target
                ))
            })?;
        Ok(Upsert::Existing(existing))
    }

    fn relations_for_statement(&self, id: &Identifier) -> Result<Vec<Relation>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM relations r
             WHERE r.source_id IN (SELECT identifier FROM components WHERE statement_id = ?1)
             OR r.target_id IN (SELECT identifier FROM components WHERE statement_id = ?1)
             ORDER BY r.id",
            RELATION_COLUMNS
        ))?;
        let relations = stmt
            .query_map(params![id.as_str()], row_to_relation)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(relations)
    }

    fn debate_graph(&self, id: &Identifier) -> Result<Option<DebateGraph>, Self::Error> {
        let Some(debate) = self.get_debate(id)? else {
            return Ok(None);
        };

        Ok(Some(DebateGraph {
            statements: self.statements_for_debate(&debate.identifier)?,
            nodes: self.components_for_debate(&debate.identifier)?,
            edges: self.relations_for_debate(&debate.identifier)?,
            debate,
        }))
    }
}

fn conversion_error(column: usize, kind: rusqlite::types::Type, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, kind, Box::new(StoreError::InvalidData(message)))
}

fn column_id(row: &Row<'_>, column: usize) -> rusqlite::Result<Identifier> {
    let raw: String = row.get(column)?;
    Identifier::parse(&raw).map_err(|e| conversion_error(column, rusqlite::types::Type::Text, e))
}

fn column_opt_id(row: &Row<'_>, column: usize) -> rusqlite::Result<Option<Identifier>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|raw| {
        Identifier::parse(&raw).map_err(|e| conversion_error(column, rusqlite::types::Type::Text, e))
    })
    .transpose()
}

fn row_to_debate(row: &Row<'_>) -> rusqlite::Result<Debate> {
    Ok(Debate {
        identifier: column_id(row, 0)?,
        name: row.get(1)?,
        source: row.get(2)?,
    })
}

fn row_to_author(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        identifier: column_id(row, 0)?,
        name: row.get(1)?,
    })
}

fn row_to_statement(row: &Row<'_>) -> rusqlite::Result<Statement> {
    let role: Option<String> = row.get(4)?;
    let role = role
        .map(|raw| {
            StatementRole::parse(&raw).ok_or_else(|| {
                conversion_error(4, rusqlite::types::Type::Text, format!("Unknown role: {}", raw))
            })
        })
        .transpose()?;

    Ok(Statement {
        identifier: column_id(row, 0)?,
        text: row.get(1)?,
        debate: column_id(row, 2)?,
        author: column_id(row, 3)?,
        role,
        classification_score: row.get(5)?,
        related_to: column_opt_id(row, 6)?,
        relation_score: row.get(7)?,
        manual_annotation: row.get(8)?,
    })
}

fn row_to_component(row: &Row<'_>) -> rusqlite::Result<Component> {
    let label: String = row.get(4)?;
    let label = ComponentLabel::parse(&label).ok_or_else(|| {
        conversion_error(4, rusqlite::types::Type::Text, format!("Unknown component label: {}", label))
    })?;

    Ok(Component {
        identifier: column_id(row, 0)?,
        statement: column_id(row, 1)?,
        start: row.get::<_, i64>(2)? as usize,
        end: row.get::<_, i64>(3)? as usize,
        label,
        score: row.get(5)?,
        fragment: row.get(6)?,
        manual_annotation: row.get(7)?,
    })
}

fn row_to_relation(row: &Row<'_>) -> rusqlite::Result<Relation> {
    let label: String = row.get(2)?;
    let label = RelationLabel::parse(&label).ok_or_else(|| {
        conversion_error(2, rusqlite::types::Type::Text, format!("Unknown relation label: {}", label))
    })?;

    Ok(Relation {
        source: column_id(row, 0)?,
        target: column_id(row, 1)?,
        label,
        score: row.get(3)?,
        manual_annotation: row.get(4)?,
    })
}
