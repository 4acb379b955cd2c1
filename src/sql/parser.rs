//! Recursive-descent SQL parser.

use super::ast::*;
use super::error::{Span, SyntaxError};
use super::lexer::Lexer;
use super::token::{Keyword, Token, TokenKind};

/// Parser producing [`Statement`]s from a SQL string.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Tokenizes the input and prepares a parser over it.
    pub fn new(input: &str) -> Result<Self, SyntaxError> {
        Ok(Self {
            tokens: Lexer::new(input).tokenize()?,
            pos: 0,
        })
    }

    /// Parses all statements in the input, separated by semicolons.
    pub fn parse(mut self) -> Result<Vec<Statement>, SyntaxError> {
        let mut statements = Vec::new();
        loop {
            while self.consume_token(&TokenKind::Semicolon) {}
            if self.is_eof() {
                return Ok(statements);
            }
            statements.push(self.parse_statement()?);
            if !self.is_eof() && !self.check_token(&TokenKind::Semicolon) {
                return Err(SyntaxError::unexpected_token(
                    "';' or end of input",
                    &self.current_name(),
                    self.current_span(),
                ));
            }
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        if self.consume_keyword(Keyword::Create) {
            if self.consume_keyword(Keyword::Table) {
                return self.parse_create_table();
            }
            if self.consume_keyword(Keyword::Index) {
                return self.parse_create_index();
            }
            return Err(SyntaxError::unexpected_token(
                "TABLE or INDEX",
                &self.current_name(),
                self.current_span(),
            ));
        }
        if self.consume_keyword(Keyword::Drop) {
            if self.consume_keyword(Keyword::Table) {
                let name = self.expect_identifier()?;
                return Ok(Statement::DropTable(DropTableStmt { name }));
            }
            if self.consume_keyword(Keyword::Index) {
                let table = self.expect_identifier()?;
                self.expect_token(&TokenKind::Dot)?;
                let index = self.expect_identifier()?;
                return Ok(Statement::DropIndex(DropIndexStmt { table, index }));
            }
            return Err(SyntaxError::unexpected_token(
                "TABLE or INDEX",
                &self.current_name(),
                self.current_span(),
            ));
        }
        if self.consume_keyword(Keyword::Show) {
            return self.parse_show();
        }
        if self.consume_keyword(Keyword::Insert) {
            return self.parse_insert();
        }
        if self.consume_keyword(Keyword::Delete) {
            return self.parse_delete();
        }
        if self.consume_keyword(Keyword::Select) {
            return self.parse_select();
        }
        Err(SyntaxError::unexpected_token(
            "a statement",
            &self.current_name(),
            self.current_span(),
        ))
    }

    fn parse_create_table(&mut self) -> Result<Statement, SyntaxError> {
        let mut if_not_exists = false;
        if self.consume_keyword(Keyword::If) {
            self.expect_keyword(Keyword::Not)?;
            self.expect_keyword(Keyword::Exists)?;
            if_not_exists = true;
        }
        let name = self.expect_identifier()?;
        self.expect_token(&TokenKind::LParen)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);
            if !self.consume_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_token(&TokenKind::RParen)?;
        Ok(Statement::CreateTable(CreateTableStmt {
            name,
            columns,
            if_not_exists,
        }))
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef, SyntaxError> {
        let name = self.expect_identifier()?;
        let data_type = if self.consume_keyword(Keyword::Int) || self.consume_keyword(Keyword::Integer)
        {
            ColumnType::Int
        } else if self.consume_keyword(Keyword::Text) {
            ColumnType::Text
        } else if self.consume_keyword(Keyword::Double) {
            ColumnType::Double
        } else {
            return Err(SyntaxError::unexpected_token(
                "a data type",
                &self.current_name(),
                self.current_span(),
            ));
        };
        Ok(ColumnDef { name, data_type })
    }

    fn parse_create_index(&mut self) -> Result<Statement, SyntaxError> {
        let index = self.expect_identifier()?;
        self.expect_keyword(Keyword::On)?;
        let table = self.expect_identifier()?;
        let index_type = if self.consume_keyword(Keyword::Using) {
            self.expect_identifier()?.to_ascii_uppercase()
        } else {
            "BTREE".to_string()
        };
        self.expect_token(&TokenKind::LParen)?;
        let columns = self.parse_identifier_list()?;
        self.expect_token(&TokenKind::RParen)?;
        Ok(Statement::CreateIndex(CreateIndexStmt {
            index,
            table,
            index_type,
            columns,
        }))
    }

    fn parse_show(&mut self) -> Result<Statement, SyntaxError> {
        if self.consume_keyword(Keyword::Tables) {
            return Ok(Statement::ShowTables);
        }
        if self.consume_keyword(Keyword::Columns) {
            self.expect_keyword(Keyword::From)?;
            let table = self.expect_identifier()?;
            return Ok(Statement::ShowColumns { table });
        }
        if self.consume_keyword(Keyword::Index) {
            self.expect_keyword(Keyword::From)?;
            let table = self.expect_identifier()?;
            return Ok(Statement::ShowIndex { table });
        }
        Err(SyntaxError::unexpected_token(
            "TABLES, COLUMNS, or INDEX",
            &self.current_name(),
            self.current_span(),
        ))
    }

    fn parse_insert(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Into)?;
        let table = self.expect_identifier()?;
        let columns = if self.consume_token(&TokenKind::LParen) {
            let names = self.parse_identifier_list()?;
            self.expect_token(&TokenKind::RParen)?;
            Some(names)
        } else {
            None
        };
        self.expect_keyword(Keyword::Values)?;
        self.expect_token(&TokenKind::LParen)?;
        let mut values = Vec::new();
        loop {
            values.push(self.parse_literal()?);
            if !self.consume_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_token(&TokenKind::RParen)?;
        Ok(Statement::Insert(InsertStmt {
            table,
            columns,
            values,
        }))
    }

    fn parse_delete(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::From)?;
        let table = self.expect_identifier()?;
        let where_clause = self.parse_optional_where()?;
        Ok(Statement::Delete(DeleteStmt {
            table,
            where_clause,
        }))
    }

    fn parse_select(&mut self) -> Result<Statement, SyntaxError> {
        let columns = if self.consume_token(&TokenKind::Asterisk) {
            SelectList::Star
        } else {
            SelectList::Columns(self.parse_identifier_list()?)
        };
        self.expect_keyword(Keyword::From)?;
        let table = self.expect_identifier()?;
        let where_clause = self.parse_optional_where()?;
        Ok(Statement::Select(SelectStmt {
            columns,
            table,
            where_clause,
        }))
    }

    fn parse_optional_where(&mut self) -> Result<Option<Expr>, SyntaxError> {
        if self.consume_keyword(Keyword::Where) {
            Ok(Some(self.parse_condition()?))
        } else {
            Ok(None)
        }
    }

    /// Condition grammar: comparisons joined by AND, with parentheses.
    fn parse_condition(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_comparison()?;
        while self.consume_keyword(Keyword::And) {
            let right = self.parse_comparison()?;
            expr = Expr::BinaryOp {
                left: Box::new(expr),
                op: BinaryOperator::And,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        if self.consume_token(&TokenKind::LParen) {
            let inner = self.parse_condition()?;
            self.expect_token(&TokenKind::RParen)?;
            return Ok(inner);
        }
        let left = self.parse_operand()?;
        let op = match self.peek_kind() {
            TokenKind::Eq => BinaryOperator::Eq,
            TokenKind::Neq => BinaryOperator::Neq,
            TokenKind::Lt => BinaryOperator::Lt,
            TokenKind::LtEq => BinaryOperator::LtEq,
            TokenKind::Gt => BinaryOperator::Gt,
            TokenKind::GtEq => BinaryOperator::GtEq,
            _ => {
                return Err(SyntaxError::unexpected_token(
                    "a comparison operator",
                    &self.current_name(),
                    self.current_span(),
                ))
            }
        };
        self.advance();
        let right = self.parse_operand()?;
        Ok(Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_operand(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::ColumnRef(name))
            }
            _ => self.parse_literal(),
        }
    }

    fn parse_literal(&mut self) -> Result<Expr, SyntaxError> {
        if self.consume_token(&TokenKind::Minus) {
            let expr = match self.peek_kind().clone() {
                TokenKind::Integer(n) => Expr::Integer(-n),
                TokenKind::Float(n) => Expr::Float(-n),
                _ => {
                    return Err(SyntaxError::unexpected_token(
                        "a number",
                        &self.current_name(),
                        self.current_span(),
                    ))
                }
            };
            self.advance();
            return Ok(expr);
        }
        let expr = match self.peek_kind().clone() {
            TokenKind::Integer(n) => Expr::Integer(n),
            TokenKind::Float(n) => Expr::Float(n),
            TokenKind::String(s) => Expr::String(s),
            _ => {
                return Err(SyntaxError::unexpected_token(
                    "a literal",
                    &self.current_name(),
                    self.current_span(),
                ))
            }
        };
        self.advance();
        Ok(expr)
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<String>, SyntaxError> {
        let mut names = vec![self.expect_identifier()?];
        while self.consume_token(&TokenKind::Comma) {
            names.push(self.expect_identifier()?);
        }
        Ok(names)
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos.min(self.tokens.len() - 1)].span
    }

    fn current_name(&self) -> String {
        self.peek_kind().display_name()
    }

    fn check_token(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn consume_token(&mut self, kind: &TokenKind) -> bool {
        if self.check_token(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_token(&mut self, kind: &TokenKind) -> Result<(), SyntaxError> {
        if self.consume_token(kind) {
            Ok(())
        } else {
            Err(SyntaxError::unexpected_token(
                &kind.display_name(),
                &self.current_name(),
                self.current_span(),
            ))
        }
    }

    fn consume_keyword(&mut self, kw: Keyword) -> bool {
        self.consume_token(&TokenKind::Keyword(kw))
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<(), SyntaxError> {
        self.expect_token(&TokenKind::Keyword(kw))
    }

    fn expect_identifier(&mut self) -> Result<String, SyntaxError> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(SyntaxError::unexpected_token(
                "an identifier",
                &self.current_name(),
                self.current_span(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(sql: &str) -> Statement {
        let mut statements = Parser::new(sql).unwrap().parse().unwrap();
        assert_eq!(statements.len(), 1);
        statements.pop().unwrap()
    }

    #[test]
    fn test_create_table() {
        let stmt = parse_one("create table t (a int, b text, c double)");
        assert_eq!(
            stmt,
            Statement::CreateTable(CreateTableStmt {
                name: "t".to_string(),
                columns: vec![
                    ColumnDef {
                        name: "a".to_string(),
                        data_type: ColumnType::Int
                    },
                    ColumnDef {
                        name: "b".to_string(),
                        data_type: ColumnType::Text
                    },
                    ColumnDef {
                        name: "c".to_string(),
                        data_type: ColumnType::Double
                    },
                ],
                if_not_exists: false,
            })
        );
    }

    #[test]
    fn test_create_table_if_not_exists() {
        let stmt = parse_one("CREATE TABLE IF NOT EXISTS t (a INTEGER)");
        let Statement::CreateTable(stmt) = stmt else {
            panic!("wrong statement");
        };
        assert!(stmt.if_not_exists);
        assert_eq!(stmt.columns[0].data_type, ColumnType::Int);
    }

    #[test]
    fn test_create_index() {
        let stmt = parse_one("create index idx on t using hash (a, b)");
        assert_eq!(
            stmt,
            Statement::CreateIndex(CreateIndexStmt {
                index: "idx".to_string(),
                table: "t".to_string(),
                index_type: "HASH".to_string(),
                columns: vec!["a".to_string(), "b".to_string()],
            })
        );
    }

    #[test]
    fn test_create_index_default_type() {
        let Statement::CreateIndex(stmt) = parse_one("create index idx on t (a)") else {
            panic!("wrong statement");
        };
        assert_eq!(stmt.index_type, "BTREE");
    }

    #[test]
    fn test_drop_statements() {
        assert_eq!(
            parse_one("drop table t"),
            Statement::DropTable(DropTableStmt {
                name: "t".to_string()
            })
        );
        assert_eq!(
            parse_one("drop index t.idx"),
            Statement::DropIndex(DropIndexStmt {
                table: "t".to_string(),
                index: "idx".to_string()
            })
        );
    }

    #[test]
    fn test_show_statements() {
        assert_eq!(parse_one("show tables"), Statement::ShowTables);
        assert_eq!(
            parse_one("show columns from t"),
            Statement::ShowColumns {
                table: "t".to_string()
            }
        );
        assert_eq!(
            parse_one("show index from t"),
            Statement::ShowIndex {
                table: "t".to_string()
            }
        );
    }

    #[test]
    fn test_insert() {
        let stmt = parse_one("insert into t values (12, 'Hello!')");
        assert_eq!(
            stmt,
            Statement::Insert(InsertStmt {
                table: "t".to_string(),
                columns: None,
                values: vec![Expr::Integer(12), Expr::String("Hello!".to_string())],
            })
        );
    }

    #[test]
    fn test_insert_negative_integer() {
        let Statement::Insert(stmt) = parse_one("insert into t values (-7)") else {
            panic!("wrong statement");
        };
        assert_eq!(stmt.values, vec![Expr::Integer(-7)]);

        let Statement::Select(stmt) = parse_one("select * from t where a = -7") else {
            panic!("wrong statement");
        };
        assert!(stmt.where_clause.is_some());
    }

    #[test]
    fn test_insert_with_columns() {
        let Statement::Insert(stmt) = parse_one("insert into t (b, a) values ('x', 1)") else {
            panic!("wrong statement");
        };
        assert_eq!(
            stmt.columns,
            Some(vec!["b".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn test_delete_with_where() {
        let Statement::Delete(stmt) = parse_one("delete from u where a = 2") else {
            panic!("wrong statement");
        };
        assert_eq!(
            stmt.where_clause,
            Some(Expr::BinaryOp {
                left: Box::new(Expr::ColumnRef("a".to_string())),
                op: BinaryOperator::Eq,
                right: Box::new(Expr::Integer(2)),
            })
        );
    }

    #[test]
    fn test_select_star_and_columns() {
        let Statement::Select(star) = parse_one("select * from t") else {
            panic!("wrong statement");
        };
        assert_eq!(star.columns, SelectList::Star);

        let Statement::Select(named) = parse_one("select a, b from t where a = 1 and b = 'x'")
        else {
            panic!("wrong statement");
        };
        assert_eq!(
            named.columns,
            SelectList::Columns(vec!["a".to_string(), "b".to_string()])
        );
        let Some(Expr::BinaryOp {
            op: BinaryOperator::And,
            ..
        }) = named.where_clause
        else {
            panic!("expected AND conjunction");
        };
    }

    #[test]
    fn test_where_parenthesized() {
        let Statement::Select(stmt) = parse_one("select * from t where (a = 1) and (b > 2)")
        else {
            panic!("wrong statement");
        };
        assert!(stmt.where_clause.is_some());
    }

    #[test]
    fn test_multiple_statements() {
        let statements = Parser::new("create table t (a int); select * from t;")
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(Parser::new("  ; ; ").unwrap().parse().unwrap().is_empty());
    }

    #[test]
    fn test_syntax_errors() {
        assert!(Parser::new("create t").unwrap().parse().is_err());
        assert!(Parser::new("select from t").unwrap().parse().is_err());
        assert!(Parser::new("insert into t values (a)").unwrap().parse().is_err());
        assert!(Parser::new("drop index idx").unwrap().parse().is_err());
        assert!(Parser::new("select * from t where a").unwrap().parse().is_err());
    }
}
