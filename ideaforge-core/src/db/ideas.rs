use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::{classify_write, decode_enum, decode_time, decode_uuid, encode_time, Database, DbError};
use crate::models::{Idea, IdeaMessage, MessageRole};
use crate::ports::IdeaRepository;

const IDEA_COLUMNS: &str = "id, title, objective, problem, scope, validate_competition, \
     validate_monetization, completed, created_at, updated_at";

fn row_to_idea(row: &Row) -> rusqlite::Result<Idea> {
    Ok(Idea {
        id: decode_uuid(0, row.get(0)?)?,
        title: row.get(1)?,
        objective: row.get(2)?,
        problem: row.get(3)?,
        scope: row.get(4)?,
        validate_competition: row.get(5)?,
        validate_monetization: row.get(6)?,
        completed: row.get(7)?,
        created_at: decode_time(8, row.get(8)?)?,
        updated_at: decode_time(9, row.get(9)?)?,
    })
}

fn row_to_message(row: &Row) -> rusqlite::Result<IdeaMessage> {
    Ok(IdeaMessage {
        id: decode_uuid(0, row.get(0)?)?,
        idea_id: decode_uuid(1, row.get(1)?)?,
        role: decode_enum(2, row.get(2)?, MessageRole::from_str)?,
        content: row.get(3)?,
        created_at: decode_time(4, row.get(4)?)?,
    })
}

pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl IdeaRepository for Database {
    fn save_idea(&self, idea: &Idea) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                &format!("INSERT INTO ideas ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)", IDEA_COLUMNS),
                params![
                    idea.id.to_string(),
                    idea.title,
                    idea.objective,
                    idea.problem,
                    idea.scope,
                    idea.validate_competition,
                    idea.validate_monetization,
                    idea.completed,
                    encode_time(&idea.created_at),
                    encode_time(&idea.updated_at),
                ],
            )
            .map_err(|e| classify_write(e, "Idea", "Idea"))?;
            Ok(())
        })
    }

    fn find_idea(&self, id: Uuid) -> Result<Option<Idea>, DbError> {
        self.with_conn(|conn| {
            let idea = conn
                .query_row(
                    &format!("SELECT {} FROM ideas WHERE id = ?1", IDEA_COLUMNS),
                    [id.to_string()],
                    row_to_idea,
                )
                .optional()?;
            Ok(idea)
        })
    }

    fn list_ideas(&self, limit: usize) -> Result<Vec<Idea>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM ideas ORDER BY created_at DESC, rowid DESC LIMIT ?1",
                IDEA_COLUMNS
            ))?;
            let ideas = stmt
                .query_map([sql_limit(limit)], row_to_idea)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ideas)
        })
    }

    fn update_idea(&self, idea: &Idea) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let rows = conn.execute(
                r#"UPDATE ideas
                   SET title = ?2, objective = ?3, problem = ?4, scope = ?5,
                       validate_competition = ?6, validate_monetization = ?7,
                       completed = ?8, updated_at = ?9
                   WHERE id = ?1"#,
                params![
                    idea.id.to_string(),
                    idea.title,
                    idea.objective,
                    idea.problem,
                    idea.scope,
                    idea.validate_competition,
                    idea.validate_monetization,
                    idea.completed,
                    encode_time(&idea.updated_at),
                ],
            )?;
            Ok(rows > 0)
        })
    }

    fn delete_idea(&self, id: Uuid) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let rows = conn.execute("DELETE FROM ideas WHERE id = ?1", [id.to_string()])?;
            Ok(rows > 0)
        })
    }

    fn append_idea_message(&self, msg: &IdeaMessage) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                r#"INSERT INTO idea_messages (id, idea_id, role, content, created_at)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![
                    msg.id.to_string(),
                    msg.idea_id.to_string(),
                    msg.role.as_str(),
                    msg.content,
                    encode_time(&msg.created_at),
                ],
            )
            .map_err(|e| classify_write(e, "Message", "Idea"))?;
            Ok(())
        })
    }

    fn list_idea_messages(&self, idea_id: Uuid, limit: usize) -> Result<Vec<IdeaMessage>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"SELECT id, idea_id, role, content, created_at
                   FROM idea_messages WHERE idea_id = ?1
                   ORDER BY created_at ASC, rowid ASC LIMIT ?2"#,
            )?;
            let messages = stmt
                .query_map(params![idea_id.to_string(), sql_limit(limit)], row_to_message)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(messages)
        })
    }
}
