//! SQL script handling for database backups.
//!
//! Splits dump scripts into executable statements, classifies schema
//! statements for data-only restores, and renders the dump format produced
//! by the export endpoint.

use chrono::{DateTime, Utc};

/// Statement prefixes that change the schema rather than the data.
const DDL_KEYWORDS: [&str; 4] = ["CREATE", "DROP", "ALTER", "TRUNCATE"];

/// Maximum characters of a failed statement kept in an import report.
pub const FAILED_STATEMENT_PREVIEW: usize = 200;

/// Split a SQL script into individual statements.
///
/// Single pass with one character of lookahead. Quoted literals (`'...'` and
/// `"..."`) are copied verbatim, including any `;` or `--` they contain.
/// Inside a literal a backslash copies the following character unchanged and
/// a doubled quote stands for the quote itself. Outside literals `--` starts
/// a comment running to the end of the line, and `;` ends a statement.
///
/// Returned statements are trimmed, non-empty and have their terminating
/// semicolon removed. A trailing statement without `;` is still returned.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = script.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(active) = quote {
            current.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            } else if c == active {
                if chars.peek() == Some(&active) {
                    current.push(active);
                    chars.next();
                } else {
                    quote = None;
                }
            }
            continue;
        }

        match c {
            '-' if chars.peek() == Some(&'-') => {
                let mut reached_newline = false;
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        reached_newline = true;
                        break;
                    }
                }
                if !reached_newline {
                    break;
                }
                // Keep tokens on either side of the comment apart
                current.push('\n');
            }
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
            }
            ';' => flush_statement(&mut statements, &mut current),
            _ => current.push(c),
        }
    }

    flush_statement(&mut statements, &mut current);
    statements
}

fn flush_statement(statements: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}

/// Check whether a statement alters the schema (CREATE, DROP, ALTER, TRUNCATE).
pub fn is_ddl(statement: &str) -> bool {
    let keyword: String = statement
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();

    DDL_KEYWORDS
        .iter()
        .any(|ddl| keyword.eq_ignore_ascii_case(ddl))
}

/// How an uploaded script is replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Execute every statement as written.
    #[default]
    Full,
    /// Skip schema statements so rows merge into an existing schema.
    DataOnly,
}

impl ImportMode {
    /// Parse the form value sent by the import page.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Some(Self::Full),
            "data_only" | "data-only" | "dataonly" => Some(Self::DataOnly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::DataOnly => "data_only",
        }
    }
}

impl std::fmt::Display for ImportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Statements selected for execution from an uploaded script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    pub statements: Vec<String>,
    /// Schema statements left out in data-only mode.
    pub skipped: usize,
}

impl ImportPlan {
    /// Split a script and apply the mode's statement filter.
    pub fn build(script: &str, mode: ImportMode) -> Self {
        let statements = split_statements(script);
        match mode {
            ImportMode::Full => ImportPlan {
                statements,
                skipped: 0,
            },
            ImportMode::DataOnly => {
                let total = statements.len();
                let statements = filter_data_only(statements);
                ImportPlan {
                    skipped: total - statements.len(),
                    statements,
                }
            }
        }
    }
}

/// Drop schema statements, keeping data statements in order.
pub fn filter_data_only(statements: Vec<String>) -> Vec<String> {
    statements.into_iter().filter(|s| !is_ddl(s)).collect()
}

/// Shorten a statement for inclusion in an error report.
pub fn preview_statement(statement: &str) -> String {
    if statement.chars().count() <= FAILED_STATEMENT_PREVIEW {
        return statement.to_string();
    }
    let mut preview: String = statement.chars().take(FAILED_STATEMENT_PREVIEW).collect();
    preview.push_str("...");
    preview
}

/// Quote a value as a MySQL string literal.
///
/// Escapes the same characters as the server's `mysql_real_escape_string`.
pub fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\0' => quoted.push_str("\\0"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '"' => quoted.push_str("\\\""),
            '\x1a' => quoted.push_str("\\Z"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Quote a table or column name with backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// One table's worth of dump input.
pub struct TableDump<'a> {
    pub table: &'a str,
    /// Statement reported by `SHOW CREATE TABLE`.
    pub create_sql: &'a str,
    /// Column names in ordinal order.
    pub columns: &'a [String],
    /// Row values in column order, `None` for SQL NULL.
    pub rows: &'a [Vec<Option<String>>],
}

/// Opening lines of a dump: banner and disabled foreign key checks.
pub fn dump_header(generated_at: DateTime<Utc>, server_version: &str) -> String {
    format!(
        "-- Test panel database backup\n\
         -- Generated: {}\n\
         -- Server version: {}\n\n\
         SET FOREIGN_KEY_CHECKS = 0;\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        server_version
    )
}

/// Closing line of a dump re-enabling foreign key checks.
pub fn dump_footer() -> &'static str {
    "SET FOREIGN_KEY_CHECKS = 1;\n"
}

/// Append the DROP/CREATE/INSERT statements for one table.
pub fn render_table_dump(out: &mut String, dump: &TableDump<'_>) {
    let table = quote_identifier(dump.table);

    out.push_str(&format!("-- Table structure for {}\n", dump.table));
    out.push_str(&format!("DROP TABLE IF EXISTS {};\n", table));
    out.push_str(dump.create_sql.trim_end().trim_end_matches(';'));
    out.push_str(";\n\n");

    if dump.rows.is_empty() {
        return;
    }

    let column_list = dump
        .columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");

    out.push_str(&format!("-- Data for {}\n", dump.table));
    for row in dump.rows {
        let values = row
            .iter()
            .map(|value| match value {
                Some(v) => quote_literal(v),
                None => "NULL".to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "INSERT INTO {} ({}) VALUES ({});\n",
            table, column_list, values
        ));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_quoted_terminators() {
        let stmts = split_statements("INSERT INTO t VALUES ('a;b', \"c--d\");\nSELECT 1;");
        assert_eq!(
            stmts,
            vec![
                "INSERT INTO t VALUES ('a;b', \"c--d\")".to_string(),
                "SELECT 1".to_string(),
            ]
        );
    }

    #[test]
    fn test_split_doubled_quote() {
        let stmts = split_statements("SELECT 'it''s fine';");
        assert_eq!(stmts, vec!["SELECT 'it''s fine'".to_string()]);
    }

    #[test]
    fn test_split_backslash_escaped_quote() {
        let stmts = split_statements("SELECT 'a\\'b';");
        assert_eq!(stmts, vec!["SELECT 'a\\'b'".to_string()]);
    }

    #[test]
    fn test_split_escaped_backslash_before_closing_quote() {
        let stmts = split_statements("SELECT 'dir\\\\'; SELECT 2;");
        assert_eq!(
            stmts,
            vec!["SELECT 'dir\\\\'".to_string(), "SELECT 2".to_string()]
        );
    }

    #[test]
    fn test_split_strips_line_comments() {
        let stmts = split_statements("-- comment with ; semicolon\nSELECT 1;");
        assert_eq!(stmts, vec!["SELECT 1".to_string()]);
    }

    #[test]
    fn test_split_comment_between_tokens() {
        let stmts = split_statements("SELECT a -- pick a\nFROM t;");
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].starts_with("SELECT a"));
        assert!(stmts[0].ends_with("FROM t"));
        assert!(!stmts[0].contains("pick"));
    }

    #[test]
    fn test_split_trailing_statement_without_semicolon() {
        assert_eq!(split_statements("SELECT 1"), vec!["SELECT 1".to_string()]);
    }

    #[test]
    fn test_split_unterminated_comment_ends_scan() {
        let stmts = split_statements("SELECT 1; SELECT 2 -- trailing; SELECT 3");
        assert_eq!(stmts, vec!["SELECT 1".to_string(), "SELECT 2".to_string()]);
    }

    #[test]
    fn test_split_skips_empty_statements() {
        let stmts = split_statements(";;\n  ;SELECT 1;;  \n");
        assert_eq!(stmts, vec!["SELECT 1".to_string()]);
    }

    #[test]
    fn test_split_handles_multibyte_text() {
        let stmts = split_statements("INSERT INTO t VALUES ('Grüße; 日本');SELECT 'ok'");
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0], "INSERT INTO t VALUES ('Grüße; 日本')");
    }

    #[test]
    fn test_is_ddl() {
        assert!(is_ddl("CREATE TABLE t (id INT)"));
        assert!(is_ddl("  drop table if exists t"));
        assert!(is_ddl("Alter TABLE t ADD COLUMN x INT"));
        assert!(is_ddl("TRUNCATE t"));
        assert!(!is_ddl("INSERT INTO t VALUES (1)"));
        assert!(!is_ddl("SET FOREIGN_KEY_CHECKS = 0"));
        assert!(!is_ddl("CREATED_AT_FIX INSERT"));
        assert!(!is_ddl("DROPPED"));
    }

    #[test]
    fn test_data_only_filter_is_idempotent() {
        let stmts = split_statements(
            "SET FOREIGN_KEY_CHECKS = 0;\n\
             DROP TABLE IF EXISTS `t`;\n\
             CREATE TABLE `t` (`id` int);\n\
             INSERT INTO `t` (`id`) VALUES ('1');\n\
             ALTER TABLE `t` ADD KEY k (`id`);\n\
             SET FOREIGN_KEY_CHECKS = 1;",
        );
        let once = filter_data_only(stmts);
        let twice = filter_data_only(once.clone());

        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
        assert!(once.iter().all(|s| !is_ddl(s)));
    }

    #[test]
    fn test_import_plan_counts_skipped() {
        let script = "DROP TABLE IF EXISTS t; CREATE TABLE t (id int); INSERT INTO t VALUES (1);";

        let full = ImportPlan::build(script, ImportMode::Full);
        assert_eq!(full.statements.len(), 3);
        assert_eq!(full.skipped, 0);

        let data_only = ImportPlan::build(script, ImportMode::DataOnly);
        assert_eq!(data_only.statements, vec!["INSERT INTO t VALUES (1)".to_string()]);
        assert_eq!(data_only.skipped, 2);
    }

    #[test]
    fn test_import_mode_parse() {
        assert_eq!(ImportMode::parse("full"), Some(ImportMode::Full));
        assert_eq!(ImportMode::parse(" DATA_ONLY "), Some(ImportMode::DataOnly));
        assert_eq!(ImportMode::parse("data-only"), Some(ImportMode::DataOnly));
        assert_eq!(ImportMode::parse("merge"), None);
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("plain"), "'plain'");
        assert_eq!(quote_literal("it's"), "'it\\'s'");
        assert_eq!(quote_literal("a\\b"), "'a\\\\b'");
        assert_eq!(quote_literal("line\nbreak"), "'line\\nbreak'");
        assert_eq!(quote_literal("say \"hi\""), "'say \\\"hi\\\"'");
    }

    #[test]
    fn test_quoted_values_survive_splitting() {
        let nasty = "semi; colon -- dash 'quote' \\ back";
        let script = format!("INSERT INTO t VALUES ({}); SELECT 1;", quote_literal(nasty));
        let stmts = split_statements(&script);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0], format!("INSERT INTO t VALUES ({})", quote_literal(nasty)));
    }

    #[test]
    fn test_preview_statement_truncates() {
        let long = "x".repeat(FAILED_STATEMENT_PREVIEW + 50);
        let preview = preview_statement(&long);
        assert_eq!(preview.chars().count(), FAILED_STATEMENT_PREVIEW + 3);
        assert!(preview.ends_with("..."));
        assert_eq!(preview_statement("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_dump_inserts_one_statement_per_row_in_column_order() {
        let columns = vec!["id".to_string(), "name".to_string(), "notes".to_string()];
        let rows = vec![
            vec![Some("1".to_string()), Some("a;b".to_string()), None],
            vec![Some("2".to_string()), Some("it's".to_string()), Some("x".to_string())],
            vec![Some("3".to_string()), Some("--".to_string()), None],
        ];
        let mut out = dump_header(Utc::now(), "0.3.0");
        render_table_dump(
            &mut out,
            &TableDump {
                table: "widgets",
                create_sql: "CREATE TABLE `widgets` (`id` int, `name` text, `notes` text)",
                columns: &columns,
                rows: &rows,
            },
        );
        out.push_str(dump_footer());

        let stmts = split_statements(&out);
        let inserts: Vec<&String> = stmts.iter().filter(|s| s.starts_with("INSERT")).collect();
        assert_eq!(inserts.len(), rows.len());
        for insert in inserts {
            assert!(insert.starts_with("INSERT INTO `widgets` (`id`, `name`, `notes`) VALUES ("));
        }

        assert_eq!(stmts.first().map(String::as_str), Some("SET FOREIGN_KEY_CHECKS = 0"));
        assert_eq!(stmts.last().map(String::as_str), Some("SET FOREIGN_KEY_CHECKS = 1"));
        assert!(stmts.contains(&"DROP TABLE IF EXISTS `widgets`".to_string()));
    }

    #[test]
    fn test_dump_empty_table_has_no_inserts() {
        let columns = vec!["id".to_string()];
        let mut out = String::new();
        render_table_dump(
            &mut out,
            &TableDump {
                table: "empty",
                create_sql: "CREATE TABLE `empty` (`id` int);",
                columns: &columns,
                rows: &[],
            },
        );

        let stmts = split_statements(&out);
        assert_eq!(
            stmts,
            vec![
                "DROP TABLE IF EXISTS `empty`".to_string(),
                "CREATE TABLE `empty` (`id` int)".to_string(),
            ]
        );
    }

    #[test]
    fn test_quote_identifier_doubles_backticks() {
        assert_eq!(quote_identifier("reports"), "`reports`");
        assert_eq!(quote_identifier("odd`name"), "`odd``name`");
    }
}
