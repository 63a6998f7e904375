use sqlx::MySqlPool;
use tracing::info;

use crate::database::DatabaseError;

/// Table definitions in dependency order. Child tables cascade on user removal.
const TABLES: &[(&str, &str)] = &[
    (
        "users",
        "CREATE TABLE IF NOT EXISTS users (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            username VARCHAR(100) NOT NULL UNIQUE,
            email VARCHAR(255) NULL UNIQUE,
            password_hash VARCHAR(255) NULL,
            is_admin BOOLEAN NOT NULL DEFAULT FALSE,
            show_womens_health BOOLEAN NOT NULL DEFAULT FALSE,
            height_cm DOUBLE NULL,
            linuxdo_id VARCHAR(64) NULL UNIQUE,
            google_id VARCHAR(64) NULL UNIQUE,
            github_id VARCHAR(64) NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            last_login_at TIMESTAMP NULL
        ) DEFAULT CHARSET = utf8mb4",
    ),
    (
        "medications",
        "CREATE TABLE IF NOT EXISTS medications (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            name VARCHAR(255) NOT NULL,
            dosage VARCHAR(255) NULL,
            frequency VARCHAR(255) NULL,
            stock INT NULL,
            medication_times TEXT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CONSTRAINT chk_medications_stock CHECK (stock IS NULL OR stock >= 0),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        ) DEFAULT CHARSET = utf8mb4",
    ),
    (
        "medication_logs",
        "CREATE TABLE IF NOT EXISTS medication_logs (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            medication_id BIGINT NOT NULL,
            taken_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            INDEX idx_medication_logs_taken (user_id, taken_at),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (medication_id) REFERENCES medications(id) ON DELETE CASCADE
        ) DEFAULT CHARSET = utf8mb4",
    ),
    (
        "daily_items",
        "CREATE TABLE IF NOT EXISTS daily_items (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            item_name VARCHAR(255) NOT NULL,
            item_type VARCHAR(20) NOT NULL,
            status VARCHAR(20) NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        ) DEFAULT CHARSET = utf8mb4",
    ),
    (
        "daily_logs",
        "CREATE TABLE IF NOT EXISTS daily_logs (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            log_date DATE NOT NULL,
            item_name VARCHAR(255) NOT NULL,
            status VARCHAR(50) NULL,
            notes TEXT NULL,
            UNIQUE KEY uq_daily_logs (user_id, log_date, item_name),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        ) DEFAULT CHARSET = utf8mb4",
    ),
    (
        "exercise_logs",
        "CREATE TABLE IF NOT EXISTS exercise_logs (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            log_date DATE NOT NULL,
            exercise_name VARCHAR(255) NOT NULL,
            duration_minutes INT NULL,
            sets INT NULL,
            reps INT NULL,
            notes TEXT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            INDEX idx_exercise_logs_date (user_id, log_date),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        ) DEFAULT CHARSET = utf8mb4",
    ),
    (
        "accounts",
        "CREATE TABLE IF NOT EXISTS accounts (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            account_name VARCHAR(255) NOT NULL,
            initial_balance BIGINT NOT NULL DEFAULT 0,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        ) DEFAULT CHARSET = utf8mb4",
    ),
    (
        "transactions",
        "CREATE TABLE IF NOT EXISTS transactions (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            account_id BIGINT NOT NULL,
            transaction_type VARCHAR(10) NOT NULL,
            amount BIGINT NOT NULL,
            category VARCHAR(100) NULL,
            notes TEXT NULL,
            transaction_date DATE NOT NULL,
            INDEX idx_transactions_date (user_id, transaction_date),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
        ) DEFAULT CHARSET = utf8mb4",
    ),
    (
        "loans",
        "CREATE TABLE IF NOT EXISTS loans (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            loan_type VARCHAR(10) NOT NULL,
            person_name VARCHAR(255) NOT NULL,
            amount BIGINT NOT NULL,
            notes TEXT NULL,
            loan_date DATE NOT NULL,
            status VARCHAR(10) NOT NULL DEFAULT 'unpaid',
            repayment_date TIMESTAMP NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        ) DEFAULT CHARSET = utf8mb4",
    ),
    (
        "loan_repayments",
        "CREATE TABLE IF NOT EXISTS loan_repayments (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            loan_id BIGINT NOT NULL,
            account_id BIGINT NOT NULL,
            amount BIGINT NOT NULL,
            repayment_date DATE NOT NULL,
            transaction_id BIGINT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (loan_id) REFERENCES loans(id) ON DELETE CASCADE,
            FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE,
            FOREIGN KEY (transaction_id) REFERENCES transactions(id) ON DELETE SET NULL
        ) DEFAULT CHARSET = utf8mb4",
    ),
    (
        "memos",
        "CREATE TABLE IF NOT EXISTS memos (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            task_name VARCHAR(500) NOT NULL,
            priority VARCHAR(10) NOT NULL DEFAULT 'medium',
            is_completed BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            completed_at TIMESTAMP NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        ) DEFAULT CHARSET = utf8mb4",
    ),
    (
        "menstrual_records",
        "CREATE TABLE IF NOT EXISTS menstrual_records (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            start_date DATE NOT NULL,
            end_date DATE NULL,
            pain_level VARCHAR(20) NULL,
            flow_volume VARCHAR(20) NULL,
            notes TEXT NULL,
            color VARCHAR(50) NULL,
            state VARCHAR(255) NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        ) DEFAULT CHARSET = utf8mb4",
    ),
    (
        "sex_logs",
        "CREATE TABLE IF NOT EXISTS sex_logs (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            log_date DATE NOT NULL,
            protection_method VARCHAR(100) NULL,
            UNIQUE KEY uq_sex_logs (user_id, log_date),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        ) DEFAULT CHARSET = utf8mb4",
    ),
    (
        "stool_logs",
        "CREATE TABLE IF NOT EXISTS stool_logs (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            log_date DATE NOT NULL,
            stool_type VARCHAR(50) NULL,
            notes TEXT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            INDEX idx_stool_logs_date (user_id, log_date),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        ) DEFAULT CHARSET = utf8mb4",
    ),
    (
        "weight_logs",
        "CREATE TABLE IF NOT EXISTS weight_logs (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            log_datetime DATETIME NOT NULL,
            weight DOUBLE NOT NULL,
            INDEX idx_weight_logs_datetime (user_id, log_datetime),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        ) DEFAULT CHARSET = utf8mb4",
    ),
];

/// Run MySQL database migrations
pub async fn run_migrations(pool: &MySqlPool) -> Result<(), DatabaseError> {
    info!("Running MySQL migrations");

    for (table, ddl) in TABLES {
        info!("Creating {} table if not exists", table);
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::MigrationError(format!("{}: {}", table, e)))?;
    }

    info!("MySQL migrations completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_table_created_first() {
        assert_eq!(TABLES[0].0, "users");
    }

    #[test]
    fn test_every_child_table_cascades_on_user_delete() {
        for (table, ddl) in TABLES.iter().skip(1) {
            assert!(
                ddl.contains("REFERENCES users(id) ON DELETE CASCADE"),
                "{} must cascade on user removal",
                table
            );
        }
    }
}
