pub const SCHEMA_VERSION: i32 = 1;

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS ideas (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    objective TEXT NOT NULL,
    problem TEXT NOT NULL,
    scope TEXT NOT NULL,
    validate_competition INTEGER NOT NULL DEFAULT 0,
    validate_monetization INTEGER NOT NULL DEFAULT 0,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS idea_messages (
    id TEXT PRIMARY KEY,
    idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
    role TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'system')),
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS action_plans (
    id TEXT PRIMARY KEY,
    idea_id TEXT NOT NULL UNIQUE REFERENCES ideas(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'in_progress', 'completed')),
    functional_requirements TEXT NOT NULL DEFAULT '',
    non_functional_requirements TEXT NOT NULL DEFAULT '',
    business_logic_flow TEXT NOT NULL DEFAULT '',
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS action_plan_messages (
    id TEXT PRIMARY KEY,
    action_plan_id TEXT NOT NULL REFERENCES action_plans(id) ON DELETE CASCADE,
    role TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'system')),
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS architectures (
    id TEXT PRIMARY KEY,
    action_plan_id TEXT NOT NULL UNIQUE REFERENCES action_plans(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'in_progress', 'completed')),
    user_stories TEXT NOT NULL DEFAULT '',
    database_type TEXT NOT NULL DEFAULT '',
    database_schema TEXT NOT NULL DEFAULT '',
    entities_relationships TEXT NOT NULL DEFAULT '',
    tech_stack TEXT NOT NULL DEFAULT '',
    architecture_pattern TEXT NOT NULL DEFAULT '',
    system_architecture TEXT NOT NULL DEFAULT '',
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS architecture_messages (
    id TEXT PRIMARY KEY,
    architecture_id TEXT NOT NULL REFERENCES architectures(id) ON DELETE CASCADE,
    role TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'system')),
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS development_modules (
    id TEXT PRIMARY KEY,
    architecture_id TEXT NOT NULL REFERENCES architectures(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    functionality TEXT NOT NULL DEFAULT '',
    dependencies JSON NOT NULL DEFAULT '[]',
    technical_details TEXT NOT NULL DEFAULT '',
    priority INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'in_progress', 'completed')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS global_chat_messages (
    id TEXT PRIMARY KEY,
    idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
    role TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'system')),
    content TEXT NOT NULL,
    affected_modules JSON NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_idea_messages_idea ON idea_messages(idea_id, created_at);
CREATE INDEX IF NOT EXISTS idx_action_plan_messages_plan ON action_plan_messages(action_plan_id, created_at);
CREATE INDEX IF NOT EXISTS idx_architecture_messages_arch ON architecture_messages(architecture_id, created_at);
CREATE INDEX IF NOT EXISTS idx_modules_architecture ON development_modules(architecture_id, priority, created_at);
CREATE INDEX IF NOT EXISTS idx_global_chat_idea ON global_chat_messages(idea_id, created_at);
"#;
