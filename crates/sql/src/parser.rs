// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive-descent parser for the statement dialect

use crate::ast::{Statement, TableRef};
use crate::error::CompileError;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::plan::Projection;
use quill_core::{
    AlterAction, ColumnDef, ColumnType, Expr, PartitionBy, Predicate, StorageMode, Value,
};

/// Parse a single statement
pub fn parse(sql: &str) -> Result<Statement, CompileError> {
    let tokens = tokenize(sql)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: sql.len(),
    };
    let statement = parser.statement()?;
    parser.eat(|k| matches!(k, TokenKind::Semicolon));
    if let Some(token) = parser.peek() {
        return Err(CompileError::new(token.position, "unexpected token after statement"));
    }
    Ok(statement)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn position(&self) -> usize {
        self.peek().map(|t| t.position).unwrap_or(self.end)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, pred: impl Fn(&TokenKind) -> bool) -> bool {
        match self.peek() {
            Some(t) if pred(&t.kind) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(keyword))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), CompileError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(CompileError::new(
                self.position(),
                format!("'{}' expected", keyword.to_ascii_lowercase()),
            ))
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), CompileError> {
        if self.eat(|k| *k == kind) {
            Ok(())
        } else {
            Err(CompileError::new(self.position(), format!("'{what}' expected")))
        }
    }

    fn ident(&mut self, what: &str) -> Result<(String, usize), CompileError> {
        let position = self.position();
        match self.bump() {
            Some(Token {
                kind: TokenKind::Ident(name),
                position,
            }) => Ok((name, position)),
            _ => Err(CompileError::new(position, format!("{what} expected"))),
        }
    }

    fn table_ref(&mut self) -> Result<TableRef, CompileError> {
        let (name, position) = self.ident("table name")?;
        Ok(TableRef { name, position })
    }

    fn statement(&mut self) -> Result<Statement, CompileError> {
        if self.eat_keyword("CREATE") {
            self.create_table()
        } else if self.eat_keyword("DROP") {
            self.expect_keyword("TABLE")?;
            Ok(Statement::DropTable {
                table: self.table_ref()?,
            })
        } else if self.eat_keyword("INSERT") {
            self.insert()
        } else if self.eat_keyword("ALTER") {
            self.alter()
        } else if self.eat_keyword("UPDATE") {
            self.update()
        } else if self.eat_keyword("SELECT") {
            self.select()
        } else {
            Err(CompileError::new(self.position(), "unsupported statement"))
        }
    }

    fn create_table(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword("TABLE")?;
        let table = self.table_ref()?;
        self.expect(TokenKind::LParen, "(")?;
        let mut columns = Vec::new();
        loop {
            let (name, _) = self.ident("column name")?;
            let ty = self.column_type()?;
            columns.push(ColumnDef::new(name, ty));
            if !self.eat(|k| matches!(k, TokenKind::Comma)) {
                break;
            }
        }
        self.expect(TokenKind::RParen, ")")?;

        let timestamp = if self.eat_keyword("TIMESTAMP") {
            self.expect(TokenKind::LParen, "(")?;
            let column = self.ident("timestamp column name")?;
            self.expect(TokenKind::RParen, ")")?;
            Some(column)
        } else {
            None
        };

        let partition_by = if self.eat_keyword("PARTITION") {
            self.expect_keyword("BY")?;
            let (unit, position) = self.ident("partition unit")?;
            unit.parse::<PartitionBy>()
                .map_err(|e| CompileError::new(position, e))?
        } else {
            PartitionBy::None
        };

        let mode = self.storage_mode_opt()?;

        Ok(Statement::CreateTable {
            table,
            columns,
            timestamp,
            partition_by,
            mode,
        })
    }

    fn storage_mode_opt(&mut self) -> Result<Option<StorageMode>, CompileError> {
        if self.eat_keyword("WAL") {
            Ok(Some(StorageMode::Wal))
        } else if self.eat_keyword("BYPASS") {
            self.expect_keyword("WAL")?;
            Ok(Some(StorageMode::BypassWal))
        } else {
            Ok(None)
        }
    }

    fn column_type(&mut self) -> Result<ColumnType, CompileError> {
        let (name, position) = self.ident("column type")?;
        name.parse::<ColumnType>()
            .map_err(|e| CompileError::new(position, e))
    }

    fn insert(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword("INTO")?;
        let table = self.table_ref()?;
        let columns = if self.eat(|k| matches!(k, TokenKind::LParen)) {
            let mut names = Vec::new();
            loop {
                names.push(self.ident("column name")?.0);
                if !self.eat(|k| matches!(k, TokenKind::Comma)) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, ")")?;
            Some(names)
        } else {
            None
        };
        self.expect_keyword("VALUES")?;
        let mut rows = Vec::new();
        loop {
            self.expect(TokenKind::LParen, "(")?;
            let mut values = Vec::new();
            loop {
                values.push(self.expr()?);
                if !self.eat(|k| matches!(k, TokenKind::Comma)) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, ")")?;
            rows.push(values);
            if !self.eat(|k| matches!(k, TokenKind::Comma)) {
                break;
            }
        }
        Ok(Statement::Insert {
            table,
            columns,
            rows,
        })
    }

    fn alter(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword("TABLE")?;
        let table = self.table_ref()?;
        let action = if self.eat_keyword("ADD") {
            self.expect_keyword("COLUMN")?;
            let (name, _) = self.ident("column name")?;
            let ty = self.column_type()?;
            AlterAction::AddColumn { name, ty }
        } else if self.eat_keyword("DROP") {
            self.expect_keyword("COLUMN")?;
            let (name, _) = self.ident("column name")?;
            AlterAction::DropColumn { name }
        } else if self.eat_keyword("RENAME") {
            self.expect_keyword("COLUMN")?;
            let (from, _) = self.ident("column name")?;
            self.expect_keyword("TO")?;
            let (to, _) = self.ident("new column name")?;
            AlterAction::RenameColumn { from, to }
        } else if self.eat_keyword("SET") {
            self.expect_keyword("TYPE")?;
            let position = self.position();
            let mode = self
                .storage_mode_opt()?
                .ok_or_else(|| CompileError::new(position, "'wal' or 'bypass wal' expected"))?;
            return Ok(Statement::SetType { table, mode });
        } else {
            return Err(CompileError::new(
                self.position(),
                "'add', 'drop', 'rename' or 'set' expected",
            ));
        };
        Ok(Statement::Alter { table, action })
    }

    fn update(&mut self) -> Result<Statement, CompileError> {
        let table = self.table_ref()?;
        self.expect_keyword("SET")?;
        let mut assignments = Vec::new();
        loop {
            let (column, _) = self.ident("column name")?;
            self.expect(TokenKind::Eq, "=")?;
            assignments.push((column, self.expr()?));
            if !self.eat(|k| matches!(k, TokenKind::Comma)) {
                break;
            }
        }
        let filter = self.where_opt()?;
        Ok(Statement::Update {
            table,
            assignments,
            filter,
        })
    }

    fn select(&mut self) -> Result<Statement, CompileError> {
        let projection = if self.eat(|k| matches!(k, TokenKind::Star)) {
            Projection::All
        } else if self.at_keyword("COUNT") {
            self.pos += 1;
            self.expect(TokenKind::LParen, "(")?;
            self.eat(|k| matches!(k, TokenKind::Star));
            self.expect(TokenKind::RParen, ")")?;
            Projection::Count
        } else {
            let mut names = Vec::new();
            loop {
                names.push(self.ident("column name")?.0);
                if !self.eat(|k| matches!(k, TokenKind::Comma)) {
                    break;
                }
            }
            Projection::Columns(names)
        };
        self.expect_keyword("FROM")?;
        let table = self.table_ref()?;
        let filter = self.where_opt()?;
        Ok(Statement::Select {
            table,
            projection,
            filter,
        })
    }

    fn where_opt(&mut self) -> Result<Option<Predicate>, CompileError> {
        if !self.eat_keyword("WHERE") {
            return Ok(None);
        }
        let (column, _) = self.ident("column name")?;
        self.expect(TokenKind::Eq, "=")?;
        Ok(Some(Predicate {
            column,
            value: self.expr()?,
        }))
    }

    fn expr(&mut self) -> Result<Expr, CompileError> {
        let position = self.position();
        let token = self
            .bump()
            .ok_or_else(|| CompileError::new(position, "expression expected"))?;
        match token.kind {
            TokenKind::Integer(v) => Ok(Expr::Literal(integer(v))),
            TokenKind::Float(v) => Ok(Expr::Literal(Value::Double(v))),
            TokenKind::Str(s) => Ok(Expr::Literal(Value::String(s))),
            TokenKind::Bind(key) => Ok(Expr::Bind(key)),
            TokenKind::Minus => {
                let position = self.position();
                match self.bump().map(|t| t.kind) {
                    Some(TokenKind::Integer(v)) => Ok(Expr::Literal(integer(-v))),
                    Some(TokenKind::Float(v)) => Ok(Expr::Literal(Value::Double(-v))),
                    _ => Err(CompileError::new(position, "number expected")),
                }
            }
            TokenKind::Ident(name) => {
                if self.eat(|k| matches!(k, TokenKind::LParen)) {
                    self.expect(TokenKind::RParen, ")")?;
                    return function(&name, token.position);
                }
                match name.to_ascii_uppercase().as_str() {
                    "NULL" => Ok(Expr::Literal(Value::Null)),
                    "TRUE" => Ok(Expr::Literal(Value::Boolean(true))),
                    "FALSE" => Ok(Expr::Literal(Value::Boolean(false))),
                    _ => Ok(Expr::Column(name)),
                }
            }
            _ => Err(CompileError::new(token.position, "expression expected")),
        }
    }
}

fn integer(v: i64) -> Value {
    match i32::try_from(v) {
        Ok(i) => Value::Int(i),
        Err(_) => Value::Long(v),
    }
}

fn function(name: &str, position: usize) -> Result<Expr, CompileError> {
    match name.to_ascii_lowercase().as_str() {
        "rnd_long" => Ok(Expr::RndLong),
        "rnd_int" => Ok(Expr::RndInt),
        "rnd_double" => Ok(Expr::RndDouble),
        "rnd_boolean" => Ok(Expr::RndBoolean),
        "now" | "systimestamp" => Ok(Expr::Now),
        _ => Err(CompileError::new(position, format!("unknown function name: {name}()"))),
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
