pub(super) const UP: &[&str] = &[
    r#"
    CREATE TABLE "mcp" (
        "id" character varying(21) NOT NULL,
        "created" TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT now(),
        "updated" TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT now(),
        "projectId" character varying(21) NOT NULL,
        "token" character varying(21) NOT NULL,
        CONSTRAINT "pk_mcp" PRIMARY KEY ("id")
    )
    "#,
    r#"CREATE UNIQUE INDEX "mcp_project_id" ON "mcp" ("projectId")"#,
    r#"
    CREATE TABLE "app_connection" (
        "id" character varying(21) NOT NULL,
        "created" TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT now(),
        "updated" TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT now(),
        "pieceName" character varying NOT NULL,
        "value" jsonb NOT NULL,
        "type" character varying NOT NULL,
        "status" character varying NOT NULL DEFAULT 'ACTIVE',
        "ownerId" character varying,
        "displayName" character varying NOT NULL,
        "externalId" character varying NOT NULL,
        "platformId" character varying NOT NULL,
        "projectIds" jsonb NOT NULL,
        "scope" character varying NOT NULL,
        "mcpId" character varying(21),
        CONSTRAINT "pk_app_connection" PRIMARY KEY ("id")
    )
    "#,
    r#"CREATE INDEX "idx_app_connection_mcp_id" ON "app_connection" ("mcpId")"#,
];

pub(super) const DOWN: &[&str] = &[
    r#"DROP TABLE IF EXISTS "app_connection""#,
    r#"DROP TABLE IF EXISTS "mcp""#,
];
