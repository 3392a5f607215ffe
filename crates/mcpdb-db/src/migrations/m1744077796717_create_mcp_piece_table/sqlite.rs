//! `SQLite` cannot drop a column that carries an index or add a foreign key
//! to an existing table, so `app_connection` is rebuilt in both directions.
//! The rebuild assumes foreign key enforcement is off for the duration.

pub(super) const UP: &[&str] = &[
    // Keep one connection per (mcpId, pieceName)
    r#"
    WITH "ranked" AS (
        SELECT
            "id",
            ROW_NUMBER() OVER (
                PARTITION BY "mcpId", "pieceName"
                ORDER BY "created" ASC, rowid ASC
            ) AS "rn"
        FROM "app_connection"
        WHERE "mcpId" IS NOT NULL
    )
    DELETE FROM "app_connection"
    WHERE "id" IN (SELECT "id" FROM "ranked" WHERE "rn" > 1)
    "#,
    r#"DROP INDEX IF EXISTS "idx_app_connection_mcp_id""#,
    r#"
    CREATE TABLE "mcp_piece" (
        "id" varchar(21) PRIMARY KEY NOT NULL,
        "created" datetime NOT NULL DEFAULT (datetime('now')),
        "updated" datetime NOT NULL DEFAULT (datetime('now')),
        "pieceName" varchar NOT NULL,
        "mcpId" varchar(21) NOT NULL,
        "connectionId" varchar(21),
        CONSTRAINT "uq_mcp_piece_connection_id" UNIQUE ("connectionId"),
        CONSTRAINT "fk_mcp_piece_mcp_id" FOREIGN KEY ("mcpId")
            REFERENCES "mcp" ("id") ON DELETE CASCADE ON UPDATE NO ACTION,
        CONSTRAINT "fk_mcp_piece_connection_id" FOREIGN KEY ("connectionId")
            REFERENCES "app_connection" ("id") ON DELETE CASCADE ON UPDATE NO ACTION
    )
    "#,
    r#"CREATE INDEX "idx_mcp_piece_mcp_id" ON "mcp_piece" ("mcpId")"#,
    r#"CREATE INDEX "idx_mcp_piece_connection_id" ON "mcp_piece" ("connectionId")"#,
    r#"CREATE UNIQUE INDEX "idx_mcp_piece_mcp_id_piece_name" ON "mcp_piece" ("mcpId", "pieceName")"#,
    r#"
    INSERT INTO "mcp_piece" ("id", "created", "updated", "pieceName", "mcpId", "connectionId")
    SELECT
        substr(lower(hex(randomblob(16))), 1, 21),
        ac."created",
        ac."updated",
        ac."pieceName",
        ac."mcpId",
        ac."id"
    FROM "app_connection" ac
    WHERE ac."mcpId" IS NOT NULL
    "#,
    r#"
    CREATE TABLE "temp_app_connection" (
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
        "mcpPieceId" varchar(21),
        CONSTRAINT "fk_app_connection_mcp_piece_id" FOREIGN KEY ("mcpPieceId")
            REFERENCES "mcp_piece" ("id") ON DELETE CASCADE ON UPDATE NO ACTION
    )
    "#,
    r#"
    INSERT INTO "temp_app_connection" (
        "id", "created", "updated", "pieceName", "value", "type", "status",
        "ownerId", "displayName", "externalId", "platformId", "projectIds",
        "scope", "mcpPieceId"
    )
    SELECT
        ac."id", ac."created", ac."updated", ac."pieceName", ac."value",
        ac."type", ac."status", ac."ownerId", ac."displayName",
        ac."externalId", ac."platformId", ac."projectIds", ac."scope",
        mp."id"
    FROM "app_connection" ac
    LEFT JOIN "mcp_piece" mp ON ac."id" = mp."connectionId"
    "#,
    r#"DROP TABLE "app_connection""#,
    r#"ALTER TABLE "temp_app_connection" RENAME TO "app_connection""#,
    r#"CREATE INDEX "idx_app_connection_mcp_piece_id" ON "app_connection" ("mcpPieceId")"#,
];

pub(super) const DOWN: &[&str] = &[
    r#"
    CREATE TABLE "temp_app_connection" (
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
    r#"
    INSERT INTO "temp_app_connection" (
        "id", "created", "updated", "pieceName", "value", "type", "status",
        "ownerId", "displayName", "externalId", "platformId", "projectIds",
        "scope", "mcpId"
    )
    SELECT
        ac."id", ac."created", ac."updated", ac."pieceName", ac."value",
        ac."type", ac."status", ac."ownerId", ac."displayName",
        ac."externalId", ac."platformId", ac."projectIds", ac."scope",
        mp."mcpId"
    FROM "app_connection" ac
    LEFT JOIN "mcp_piece" mp ON ac."mcpPieceId" = mp."id"
    "#,
    r#"DROP TABLE "app_connection""#,
    r#"ALTER TABLE "temp_app_connection" RENAME TO "app_connection""#,
    r#"CREATE INDEX "idx_app_connection_mcp_id" ON "app_connection" ("mcpId")"#,
    r#"DROP INDEX IF EXISTS "idx_mcp_piece_mcp_id_piece_name""#,
    r#"DROP INDEX IF EXISTS "idx_mcp_piece_connection_id""#,
    r#"DROP INDEX IF EXISTS "idx_mcp_piece_mcp_id""#,
    r#"DROP TABLE IF EXISTS "mcp_piece""#,
];
