use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
/// Pool of 5 with overflow headroom; connections are validated before reuse.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .min_connections(5)
        .max_connections(15)
        .test_before_acquire(true)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates all tables if they do not exist yet.
/// Called once at startup; schema migrations are out of scope.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    let ddl = [
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id          SERIAL PRIMARY KEY,
            name        VARCHAR(255) NOT NULL,
            email       VARCHAR(255) NOT NULL UNIQUE,
            phone       VARCHAR(50),
            location    VARCHAR(255),
            bio         TEXT,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS education (
            id          SERIAL PRIMARY KEY,
            profile_id  INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            institution VARCHAR(255) NOT NULL,
            degree      VARCHAR(255) NOT NULL,
            field       VARCHAR(255),
            start_date  VARCHAR(50),
            end_date    VARCHAR(50),
            gpa         DOUBLE PRECISION,
            description TEXT
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS work_experience (
            id          SERIAL PRIMARY KEY,
            profile_id  INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            company     VARCHAR(255) NOT NULL,
            position    VARCHAR(255) NOT NULL,
            description TEXT,
            start_date  VARCHAR(50),
            end_date    VARCHAR(50),
            is_current  BOOLEAN NOT NULL DEFAULT FALSE,
            location    VARCHAR(255)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id          SERIAL PRIMARY KEY,
            profile_id  INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            name        VARCHAR(255) NOT NULL,
            description TEXT,
            url         VARCHAR(500),
            github_url  VARCHAR(500),
            demo_url    VARCHAR(500),
            start_date  VARCHAR(50),
            end_date    VARCHAR(50),
            status      VARCHAR(50)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS skills (
            id               SERIAL PRIMARY KEY,
            profile_id       INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            name             VARCHAR(255) NOT NULL,
            level            VARCHAR(50),
            category         VARCHAR(100),
            years_experience DOUBLE PRECISION
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS social_links (
            id          SERIAL PRIMARY KEY,
            profile_id  INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            platform    VARCHAR(100) NOT NULL,
            url         VARCHAR(500) NOT NULL,
            icon        VARCHAR(100)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS project_skills (
            project_id  INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            skill_id    INTEGER NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
            PRIMARY KEY (project_id, skill_id)
        )
        "#,
    ];

    for stmt in ddl {
        sqlx::query(stmt).execute(pool).await?;
    }

    info!("Database schema initialized");
    Ok(())
}

/// Checks whether the database answers a trivial query.
pub async fn check_db_connection(pool: &PgPool) -> bool {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .is_ok()
}
