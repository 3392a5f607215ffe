pub(super) const UP: &[&str] = &[
    r#"
    CREATE TABLE "mcp" (
        "id" varchar(21) PRIMARY KEY NOT NULL,
        "created" datetime NOT NULL DEFAULT (datetime('now')),
        "updated" datetime NOT NULL DEFAULT (datetime('now')),
        "projectId" varchar(21) NOT NULL,
        "token" varchar(21) NOT NULL
    )
    "#,
    r#"CREATE UNIQUE INDEX "mcp_project_id" ON "mcp" ("projectId")"#,
    r#"
    CREATE TABLE "app_connection" (
        "id" varchar(21) PRIMARY KEY NOT NULL,
        "created" datetime NOT NULL DEFAULT (datetime('now')),
        "updated" datetime NOT NULL DEFAULT (datetime('now')),
        "pieceName" varchar NOT NULL,
        "value" text NOT NULL,
        "type" varchar NOT NULL,
        "status" varchar NOT NULL DEFAULT ('ACTIVE'),
        "ownerId" varchar,
        "displayName" varchar NOT NULL,
        "externalId" varchar NOT NULL,
        "platformId" varchar NOT NULL,
        "projectIds" text NOT NULL,
        "scope" varchar NOT NULL,
        "mcpId" varchar(21)
    )
    "#,
    r#"CREATE INDEX "idx_app_connection_mcp_id" ON "app_connection" ("mcpId")"#,
];

pub(super) const DOWN: &[&str] = &[
    r#"DROP TABLE IF EXISTS "app_connection""#,
    r#"DROP TABLE IF EXISTS "mcp""#,
];
