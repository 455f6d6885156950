use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::ideas::sql_limit;
use super::{classify_write, decode_enum, decode_time, decode_uuid, encode_time, Database, DbError};
use crate::models::{Architecture, ArchitectureMessage, MessageRole, StageStatus};
use crate::ports::ArchitectureRepository;

const ARCH_COLUMNS: &str = "id, action_plan_id, status, user_stories, database_type, \
     database_schema, entities_relationships, tech_stack, architecture_pattern, \
     system_architecture, completed, created_at, updated_at";

fn row_to_architecture(row: &Row) -> rusqlite::Result<Architecture> {
    Ok(Architecture {
        id: decode_uuid(0, row.get(0)?)?,
        action_plan_id: decode_uuid(1, row.get(1)?)?,
        status: decode_enum(2, row.get(2)?, StageStatus::from_str)?,
        user_stories: row.get(3)?,
        database_type: row.get(4)?,
        database_schema: row.get(5)?,
        entities_relationships: row.get(6)?,
        tech_stack: row.get(7)?,
        architecture_pattern: row.get(8)?,
        system_architecture: row.get(9)?,
        completed: row.get(10)?,
        created_at: decode_time(11, row.get(11)?)?,
        updated_at: decode_time(12, row.get(12)?)?,
    })
}

fn row_to_message(row: &Row) -> rusqlite::Result<ArchitectureMessage> {
    Ok(ArchitectureMessage {
        id: decode_uuid(0, row.get(0)?)?,
        architecture_id: decode_uuid(1, row.get(1)?)?,
        role: decode_enum(2, row.get(2)?, MessageRole::from_str)?,
        content: row.get(3)?,
        created_at: decode_time(4, row.get(4)?)?,
    })
}

impl ArchitectureRepository for Database {
    fn save_architecture(&self, arch: &Architecture) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO architectures ({}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                    ARCH_COLUMNS
                ),
                params![
                    arch.id.to_string(),
                    arch.action_plan_id.to_string(),
                    arch.status.as_str(),
                    arch.user_stories,
                    arch.database_type,
                    arch.database_schema,
                    arch.entities_relationships,
                    arch.tech_stack,
                    arch.architecture_pattern,
                    arch.system_architecture,
                    arch.completed,
                    encode_time(&arch.created_at),
                    encode_time(&arch.updated_at),
                ],
            )
            .map_err(|e| classify_write(e, "Architecture", "Action plan"))?;
            Ok(())
        })
    }

    fn find_architecture(&self, id: Uuid) -> Result<Option<Architecture>, DbError> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM architectures WHERE id = ?1", ARCH_COLUMNS),
                    [id.to_string()],
                    row_to_architecture,
                )
                .optional()?)
        })
    }

    fn find_architecture_by_action_plan(
        &self,
        action_plan_id: Uuid,
    ) -> Result<Option<Architecture>, DbError> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM architectures WHERE action_plan_id = ?1", ARCH_COLUMNS),
                    [action_plan_id.to_string()],
                    row_to_architecture,
                )
                .optional()?)
        })
    }

    fn update_architecture(&self, arch: &Architecture) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let rows = conn.execute(
                r#"UPDATE architectures
                   SET status = ?2, user_stories = ?3, database_type = ?4,
                       database_schema = ?5, entities_relationships = ?6, tech_stack = ?7,
                       architecture_pattern = ?8, system_architecture = ?9,
                       completed = ?10, updated_at = ?11
                   WHERE id = ?1"#,
                params![
                    arch.id.to_string(),
                    arch.status.as_str(),
                    arch.user_stories,
                    arch.database_type,
                    arch.database_schema,
                    arch.entities_relationships,
                    arch.tech_stack,
                    arch.architecture_pattern,
                    arch.system_architecture,
                    arch.completed,
                    encode_time(&arch.updated_at),
                ],
            )?;
            Ok(rows > 0)
        })
    }

    fn delete_architecture(&self, id: Uuid) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let rows = conn.execute("DELETE FROM architectures WHERE id = ?1", [id.to_string()])?;
            Ok(rows > 0)
        })
    }

    fn append_architecture_message(&self, msg: &ArchitectureMessage) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                r#"INSERT INTO architecture_messages (id, architecture_id, role, content, created_at)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![
                    msg.id.to_string(),
                    msg.architecture_id.to_string(),
                    msg.role.as_str(),
                    msg.content,
                    encode_time(&msg.created_at),
                ],
            )
            .map_err(|e| classify_write(e, "Message", "Architecture"))?;
            Ok(())
        })
    }

    fn list_architecture_messages(
        &self,
        architecture_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ArchitectureMessage>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"SELECT id, architecture_id, role, content, created_at
                   FROM architecture_messages WHERE architecture_id = ?1
                   ORDER BY created_at ASC, rowid ASC LIMIT ?2"#,
            )?;
            let messages = stmt
                .query_map(params![architecture_id.to_string(), sql_limit(limit)], row_to_message)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(messages)
        })
    }
}
