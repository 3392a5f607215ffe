pub(super) const UP: &[&str] = &[
    // Keep one connection per (mcpId, pieceName); equal timestamps fall back to id
    r#"
    WITH "ranked" AS (
        SELECT
            "id",
            ROW_NUMBER() OVER (
                PARTITION BY "mcpId", "pieceName"
                ORDER BY "created" ASC, "id" ASC
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
        "id" character varying(21) NOT NULL,
        "created" TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT now(),
        "updated" TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT now(),
        "pieceName" character varying NOT NULL,
        "mcpId" character varying(21) NOT NULL,
        "connectionId" character varying(21),
        CONSTRAINT "pk_mcp_piece" PRIMARY KEY ("id"),
        CONSTRAINT "uq_mcp_piece_connection_id" UNIQUE ("connectionId")
    )
    "#,
    r#"CREATE INDEX "idx_mcp_piece_mcp_id" ON "mcp_piece" ("mcpId")"#,
    r#"CREATE INDEX "idx_mcp_piece_connection_id" ON "mcp_piece" ("connectionId")"#,
    r#"CREATE UNIQUE INDEX "idx_mcp_piece_mcp_id_piece_name" ON "mcp_piece" ("mcpId", "pieceName")"#,
    r#"ALTER TABLE "app_connection" ADD COLUMN "mcpPieceId" character varying(21)"#,
    r#"CREATE INDEX "idx_app_connection_mcp_piece_id" ON "app_connection" ("mcpPieceId")"#,
    r#"
    INSERT INTO "mcp_piece" ("id", "created", "updated", "pieceName", "mcpId", "connectionId")
    SELECT
        substr(md5(random()::text || ac."id"), 1, 21),
        ac."created",
        ac."updated",
        ac."pieceName",
        ac."mcpId",
        ac."id"
    FROM "app_connection" ac
    WHERE ac."mcpId" IS NOT NULL
    "#,
    r#"
    UPDATE "app_connection" ac
    SET "mcpPieceId" = mp."id"
    FROM "mcp_piece" mp
    WHERE ac."id" = mp."connectionId"
    "#,
    r#"
    ALTER TABLE "mcp_piece"
    ADD CONSTRAINT "fk_mcp_piece_mcp_id" FOREIGN KEY ("mcpId")
    REFERENCES "mcp" ("id") ON DELETE CASCADE ON UPDATE NO ACTION
    "#,
    r#"
    ALTER TABLE "mcp_piece"
    ADD CONSTRAINT "fk_mcp_piece_connection_id" FOREIGN KEY ("connectionId")
    REFERENCES "app_connection" ("id") ON DELETE CASCADE ON UPDATE NO ACTION
    "#,
    r#"
    ALTER TABLE "app_connection"
    ADD CONSTRAINT "fk_app_connection_mcp_piece_id" FOREIGN KEY ("mcpPieceId")
    REFERENCES "mcp_piece" ("id") ON DELETE CASCADE ON UPDATE NO ACTION
    "#,
    r#"ALTER TABLE "app_connection" DROP COLUMN IF EXISTS "mcpId""#,
];

pub(super) const DOWN: &[&str] = &[
    r#"ALTER TABLE "app_connection" DROP CONSTRAINT IF EXISTS "fk_app_connection_mcp_piece_id""#,
    r#"ALTER TABLE "mcp_piece" DROP CONSTRAINT IF EXISTS "fk_mcp_piece_connection_id""#,
    r#"ALTER TABLE "mcp_piece" DROP CONSTRAINT IF EXISTS "fk_mcp_piece_mcp_id""#,
    r#"DROP INDEX IF EXISTS "idx_app_connection_mcp_piece_id""#,
    r#"DROP INDEX IF EXISTS "idx_mcp_piece_mcp_id_piece_name""#,
    r#"DROP INDEX IF EXISTS "idx_mcp_piece_connection_id""#,
    r#"DROP INDEX IF EXISTS "idx_mcp_piece_mcp_id""#,
    r#"ALTER TABLE "app_connection" ADD COLUMN "mcpId" character varying(21)"#,
    r#"
    UPDATE "app_connection" ac
    SET "mcpId" = mp."mcpId"
    FROM "mcp_piece" mp
    WHERE ac."mcpPieceId" = mp."id"
    "#,
    r#"ALTER TABLE "app_connection" DROP COLUMN IF EXISTS "mcpPieceId""#,
    r#"CREATE INDEX "idx_app_connection_mcp_id" ON "app_connection" ("mcpId")"#,
    r#"DROP TABLE IF EXISTS "mcp_piece""#,
];
