use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::ideas::sql_limit;
use super::{
    classify_write, decode_enum, decode_json, decode_time, decode_uuid, encode_time, Database,
    DbError,
};
use crate::models::{DevelopmentModule, GlobalChatMessage, MessageRole, ModuleStatus};
use crate::ports::DevModuleRepository;

const MODULE_COLUMNS: &str = "id, architecture_id, name, description, functionality, \
     dependencies, technical_details, priority, status, created_at, updated_at";

fn row_to_module(row: &Row) -> rusqlite::Result<DevelopmentModule> {
    Ok(DevelopmentModule {
        id: decode_uuid(0, row.get(0)?)?,
        architecture_id: decode_uuid(1, row.get(1)?)?,
        name: row.get(2)?,
        description: row.get(3)?,
        functionality: row.get(4)?,
        dependencies: decode_json(5, row.get(5)?)?,
        technical_details: row.get(6)?,
        priority: row.get(7)?,
        status: decode_enum(8, row.get(8)?, ModuleStatus::from_str)?,
        created_at: decode_time(9, row.get(9)?)?,
        updated_at: decode_time(10, row.get(10)?)?,
    })
}

fn row_to_global_message(row: &Row) -> rusqlite::Result<GlobalChatMessage> {
    Ok(GlobalChatMessage {
        id: decode_uuid(0, row.get(0)?)?,
        idea_id: decode_uuid(1, row.get(1)?)?,
        role: decode_enum(2, row.get(2)?, MessageRole::from_str)?,
        content: row.get(3)?,
        affected_modules: decode_json(4, row.get(4)?)?,
        created_at: decode_time(5, row.get(5)?)?,
    })
}

fn insert_module(conn: &Connection, module: &DevelopmentModule) -> Result<(), DbError> {
    let dependencies = serde_json::to_string(&module.dependencies)?;
    conn.prepare_cached(&format!(
        "INSERT INTO development_modules ({}) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        MODULE_COLUMNS
    ))?
    .execute(params![
        module.id.to_string(),
        module.architecture_id.to_string(),
        module.name,
        module.description,
        module.functionality,
        dependencies,
        module.technical_details,
        module.priority,
        module.status.as_str(),
        encode_time(&module.created_at),
        encode_time(&module.updated_at),
    ])
    .map_err(|e| classify_write(e, "Development module", "Architecture"))?;
    Ok(())
}

impl DevModuleRepository for Database {
    fn save_module(&self, module: &DevelopmentModule) -> Result<(), DbError> {
        self.with_conn(|conn| insert_module(conn, module))
    }

    fn save_modules(&self, modules: &[DevelopmentModule]) -> Result<(), DbError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for module in modules {
                insert_module(&tx, module)?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    fn find_module(&self, id: Uuid) -> Result<Option<DevelopmentModule>, DbError> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM development_modules WHERE id = ?1", MODULE_COLUMNS),
                    [id.to_string()],
                    row_to_module,
                )
                .optional()?)
        })
    }

    fn list_modules(&self, architecture_id: Uuid) -> Result<Vec<DevelopmentModule>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM development_modules WHERE architecture_id = ?1 \
                 ORDER BY priority ASC, created_at ASC, rowid ASC",
                MODULE_COLUMNS
            ))?;
            let modules = stmt
                .query_map([architecture_id.to_string()], row_to_module)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(modules)
        })
    }

    fn update_module(&self, module: &DevelopmentModule) -> Result<bool, DbError> {
        let dependencies = serde_json::to_string(&module.dependencies)?;
        self.with_conn(|conn| {
            let rows = conn.execute(
                r#"UPDATE development_modules
                   SET name = ?2, description = ?3, functionality = ?4, dependencies = ?5,
                       technical_details = ?6, priority = ?7, status = ?8, updated_at = ?9
                   WHERE id = ?1"#,
                params![
                    module.id.to_string(),
                    module.name,
                    module.description,
                    module.functionality,
                    dependencies,
                    module.technical_details,
                    module.priority,
                    module.status.as_str(),
                    encode_time(&module.updated_at),
                ],
            )?;
            Ok(rows > 0)
        })
    }

    fn delete_module(&self, id: Uuid) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let rows = conn.execute(
                "DELETE FROM development_modules WHERE id = ?1",
                [id.to_string()],
            )?;
            Ok(rows > 0)
        })
    }

    fn delete_modules_for_architecture(&self, architecture_id: Uuid) -> Result<usize, DbError> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM development_modules WHERE architecture_id = ?1",
                [architecture_id.to_string()],
            )?)
        })
    }

    fn append_global_message(&self, msg: &GlobalChatMessage) -> Result<(), DbError> {
        let affected = serde_json::to_string(&msg.affected_modules)?;
        self.with_conn(|conn| {
            conn.execute(
                r#"INSERT INTO global_chat_messages
                   (id, idea_id, role, content, affected_modules, created_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                params![
                    msg.id.to_string(),
                    msg.idea_id.to_string(),
                    msg.role.as_str(),
                    msg.content,
                    affected,
                    encode_time(&msg.created_at),
                ],
            )
            .map_err(|e| classify_write(e, "Message", "Idea"))?;
            Ok(())
        })
    }

    fn list_global_messages(
        &self,
        idea_id: Uuid,
        limit: usize,
    ) -> Result<Vec<GlobalChatMessage>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"SELECT id, idea_id, role, content, affected_modules, created_at
                   FROM global_chat_messages WHERE idea_id = ?1
                   ORDER BY created_at ASC, rowid ASC LIMIT ?2"#,
            )?;
            let messages = stmt
                .query_map(params![idea_id.to_string(), sql_limit(limit)], row_to_global_message)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(messages)
        })
    }
}
