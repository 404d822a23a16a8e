// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Type mapping from Hive Metastore type descriptors to Arrow data types.
//!
//! The metastore stores column types as free-form DDL strings such as
//! `struct<a:int,b:array<string>>`. [`parse_type`] turns them into an Arrow
//! [`DataType`] tree. Parsing never fails: anything it cannot understand
//! becomes [`DataType::Null`] together with a [`TypeDiagnostic`], so one bad
//! column cannot prevent the rest of a schema from being built.
//!
//! See <https://cwiki.apache.org/confluence/display/hive/languagemanual+types>.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use arrow_schema::{
    DataType, Field, Fields, Schema, SchemaRef, TimeUnit, DECIMAL128_MAX_PRECISION,
    DECIMAL256_MAX_PRECISION,
};
use regex::Regex;

use crate::aware_split::{aware_split, unquote, SplitOptions};
use crate::metastore::FieldSchema;

/// Metadata key holding a column comment on an Arrow [`Field`].
pub const COMMENT_METADATA_KEY: &str = "comment";

pub const DEFAULT_DECIMAL_PRECISION: u8 = 10;
pub const DEFAULT_DECIMAL_SCALE: i8 = 0;

/// Deepest `array`/`map`/`struct` nesting that is parsed; anything below it
/// degrades to `Null`.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Leading type keyword, optionally followed by `<options>` or `(options)`.
static TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(?P<type>DOUBLE\s+PRECISION|\w+)\s*(?:<(?P<angle>.*)>|\((?P<paren>.*)\))?")
        .expect("type pattern is valid")
});

/// Why a type descriptor (or part of one) degraded to `Null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The text does not start with a type keyword.
    Unparsable,
    /// The keyword is not a known Hive type.
    UnsupportedType,
    /// The keyword is known but its options are missing or malformed.
    MalformedOptions,
    /// A column has an empty name.
    EmptyName,
}

/// A non-fatal notice produced while parsing a type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDiagnostic {
    pub kind: DiagnosticKind,
    /// The (sub-)descriptor that could not be mapped.
    pub type_text: String,
    pub message: String,
}

impl fmt::Display for TypeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ('{}')", self.message, self.type_text)
    }
}

/// Result of [`parse_type`]: the type tree plus any diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedType {
    pub data_type: DataType,
    pub diagnostics: Vec<TypeDiagnostic>,
}

impl ParsedType {
    /// True when every part of the descriptor was understood.
    pub fn is_exact(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parse a Hive type descriptor into an Arrow [`DataType`].
pub fn parse_type(type_text: &str) -> ParsedType {
    let mut parser = TypeParser::default();
    let data_type = parser.parse(type_text);
    ParsedType {
        data_type,
        diagnostics: parser.diagnostics,
    }
}

/// Parse a Hive type descriptor, logging diagnostics instead of returning them.
pub fn parse_dtype(type_text: &str) -> DataType {
    let parsed = parse_type(type_text);
    for diagnostic in &parsed.diagnostics {
        tracing::warn!(type_text, %diagnostic, "could not fully map Hive type");
    }
    parsed.data_type
}

#[derive(Default)]
struct TypeParser {
    depth: usize,
    diagnostics: Vec<TypeDiagnostic>,
}

impl TypeParser {
    fn parse(&mut self, type_text: &str) -> DataType {
        if self.depth >= MAX_NESTING_DEPTH {
            return self.degrade(
                DiagnosticKind::MalformedOptions,
                type_text.trim(),
                "type nesting is too deep",
            );
        }
        self.depth += 1;
        let data_type = self.parse_keyword(type_text.trim());
        self.depth -= 1;
        data_type
    }

    fn parse_keyword(&mut self, text: &str) -> DataType {
        let Some(captures) = TYPE_PATTERN.captures(text) else {
            return self.degrade(DiagnosticKind::Unparsable, text, "could not parse type name");
        };
        let keyword = captures["type"]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        let options = captures
            .name("angle")
            .or_else(|| captures.name("paren"))
            .map(|m| m.as_str());

        match keyword.as_str() {
            // Structural
            "ARRAY" => self.parse_array(text, options),
            "MAP" => self.parse_map(text, options),
            "STRUCT" => self.parse_struct(text, options),

            // Date and time
            "DATE" => DataType::Date32,
            "TIMESTAMP" => DataType::Timestamp(TimeUnit::Microsecond, None),
            // Day-time intervals with sub-second units are not distinguished yet.
            "INTERVAL" => DataType::Duration(TimeUnit::Second),

            // String & binary; Arrow has no fixed-length string, so lengths are dropped
            "STRING" | "VARCHAR" | "CHAR" => DataType::Utf8,
            "BINARY" => DataType::Binary,

            // Fixed precision
            "DECIMAL" | "NUMERIC" => self.parse_decimal(text, options),

            // Floating point
            "FLOAT" => DataType::Float32,
            "DOUBLE" | "DOUBLE PRECISION" => DataType::Float64,

            // Integer
            "TINYINT" => DataType::Int8,
            "SMALLINT" => DataType::Int16,
            "INT" | "INTEGER" => DataType::Int32,
            "BIGINT" => DataType::Int64,

            "BOOLEAN" => DataType::Boolean,

            _ => self.degrade(DiagnosticKind::UnsupportedType, text, "unsupported datatype"),
        }
    }

    fn parse_array(&mut self, text: &str, options: Option<&str>) -> DataType {
        let Some(item) = non_empty(options) else {
            return self.degrade(
                DiagnosticKind::MalformedOptions,
                text,
                "array is missing its element type",
            );
        };
        let item_type = self.parse(item);
        DataType::List(Arc::new(Field::new("item", item_type, true)))
    }

    fn parse_map(&mut self, text: &str, options: Option<&str>) -> DataType {
        let parts = split_top_level(options.unwrap_or_default(), ',', -1);
        let [key, value] = parts.as_slice() else {
            return self.degrade(
                DiagnosticKind::MalformedOptions,
                text,
                "map requires exactly a key and a value type",
            );
        };
        let key_type = self.parse(key);
        let value_type = self.parse(value);
        let entries = Fields::from(vec![
            Field::new("key", key_type, false),
            Field::new("value", value_type, true),
        ]);
        DataType::Map(
            Arc::new(Field::new("entries", DataType::Struct(entries), false)),
            false,
        )
    }

    fn parse_struct(&mut self, text: &str, options: Option<&str>) -> DataType {
        let Some(options) = non_empty(options) else {
            return self.degrade(
                DiagnosticKind::MalformedOptions,
                text,
                "struct has no fields",
            );
        };

        let mut fields = Vec::new();
        for entry in split_top_level(options, ',', -1) {
            let Some((name, field_type)) = split_struct_entry(entry.trim()) else {
                return self.degrade(
                    DiagnosticKind::MalformedOptions,
                    text,
                    "struct field is missing a name or a type",
                );
            };
            let name = unquote_identifier(name);
            if name.is_empty() {
                return self.degrade(
                    DiagnosticKind::MalformedOptions,
                    text,
                    "struct field has an empty name",
                );
            }
            let field_type = self.parse(field_type);
            fields.push(Field::new(name, field_type, true));
        }
        DataType::Struct(Fields::from(fields))
    }

    fn parse_decimal(&mut self, text: &str, options: Option<&str>) -> DataType {
        let Some(options) = non_empty(options) else {
            return DataType::Decimal128(DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE);
        };

        let parts = split_top_level(options, ',', -1);
        let (precision, scale) = match parts.as_slice() {
            [precision] => (precision.trim().parse::<u8>(), Ok(0u8)),
            [precision, scale] => (precision.trim().parse::<u8>(), scale.trim().parse::<u8>()),
            _ => {
                return self.degrade(
                    DiagnosticKind::MalformedOptions,
                    text,
                    "decimal takes at most a precision and a scale",
                )
            }
        };
        let (Ok(precision), Ok(scale)) = (precision, scale) else {
            return self.degrade(
                DiagnosticKind::MalformedOptions,
                text,
                "decimal precision and scale must be unsigned integers",
            );
        };
        if precision == 0 || scale > precision {
            return self.degrade(
                DiagnosticKind::MalformedOptions,
                text,
                "decimal requires 1 <= precision and scale <= precision",
            );
        }

        // scale <= precision <= 76, so the cast to i8 is lossless
        if precision <= DECIMAL128_MAX_PRECISION {
            DataType::Decimal128(precision, scale as i8)
        } else if precision <= DECIMAL256_MAX_PRECISION {
            DataType::Decimal256(precision, scale as i8)
        } else {
            self.degrade(
                DiagnosticKind::MalformedOptions,
                text,
                "decimal precision exceeds the supported maximum",
            )
        }
    }

    fn degrade(&mut self, kind: DiagnosticKind, text: &str, message: &str) -> DataType {
        self.diagnostics.push(TypeDiagnostic {
            kind,
            type_text: text.to_string(),
            message: message.to_string(),
        });
        DataType::Null
    }
}

fn non_empty(options: Option<&str>) -> Option<&str> {
    options.filter(|o| !o.trim().is_empty())
}

/// Split type options at top-level delimiters, treating `<>` and `()` as nesting.
fn split_top_level(text: &str, delimiter: char, max_split: i64) -> Vec<&str> {
    let options = SplitOptions::default()
        .with_delimiter(delimiter)
        .with_max_split(max_split)
        .with_brackets('<', '>')
        .with_extra_brackets('(', ')');
    match aware_split(text, options) {
        Ok(parts) => parts.collect(),
        Err(_) => vec![text],
    }
}

/// Split a struct entry into name and type: `name:type` or `name type`.
fn split_struct_entry(entry: &str) -> Option<(&str, &str)> {
    let quote_options = |delimiter: char| {
        let options = SplitOptions::default()
            .with_delimiter(delimiter)
            .with_max_split(1)
            .with_brackets('<', '>')
            .with_extra_brackets('(', ')');
        if entry.starts_with('`') {
            options.with_quote('`', "``")
        } else {
            options
        }
    };

    for delimiter in [':', ' '] {
        let mut parts = aware_split(entry, quote_options(delimiter)).ok()?;
        if let (Some(name), Some(field_type)) = (parts.next(), parts.next()) {
            let field_type = field_type.trim();
            if field_type.is_empty() {
                return None;
            }
            return Some((name.trim(), field_type));
        }
    }
    None
}

fn unquote_identifier(name: &str) -> String {
    if name.starts_with('`') {
        unquote(name, '`', '`').into_owned()
    } else {
        unquote(name, '"', '\\').into_owned()
    }
}

/// A type diagnostic attributed to a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDiagnostic {
    pub column: String,
    pub diagnostic: TypeDiagnostic,
}

impl fmt::Display for ColumnDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column '{}': {}", self.column, self.diagnostic)
    }
}

/// Result of [`convert_schema`].
#[derive(Debug, Clone)]
pub struct SchemaConversion {
    pub schema: SchemaRef,
    pub diagnostics: Vec<ColumnDiagnostic>,
}

/// Convert one metastore column into a nullable Arrow [`Field`].
///
/// The comment is attached as field metadata only when it is non-empty, so
/// fields without comments compare equal to plain `Field::new` fields. An
/// empty column name is kept but reported.
pub fn convert_field(column: &FieldSchema) -> (Field, Vec<TypeDiagnostic>) {
    let mut parsed = parse_type(&column.type_name);
    if column.name.trim().is_empty() {
        parsed.diagnostics.push(TypeDiagnostic {
            kind: DiagnosticKind::EmptyName,
            type_text: column.type_name.clone(),
            message: "column has an empty name".to_string(),
        });
    }
    let mut field = Field::new(&column.name, parsed.data_type, true);
    if let Some(comment) = column.comment.as_deref().filter(|c| !c.is_empty()) {
        field = field.with_metadata(HashMap::from([(
            COMMENT_METADATA_KEY.to_string(),
            comment.to_string(),
        )]));
    }
    (field, parsed.diagnostics)
}

/// Assemble a schema from data columns followed by partition columns.
///
/// Partition values come from the directory layout rather than file contents,
/// so partition columns always come last, each list keeping its own order.
pub fn convert_schema(columns: &[FieldSchema], partition_columns: &[FieldSchema]) -> SchemaConversion {
    let mut fields = Vec::with_capacity(columns.len() + partition_columns.len());
    let mut diagnostics = Vec::new();

    for column in columns.iter().chain(partition_columns) {
        let (field, column_diagnostics) = convert_field(column);
        diagnostics.extend(column_diagnostics.into_iter().map(|diagnostic| ColumnDiagnostic {
            column: column.name.clone(),
            diagnostic,
        }));
        fields.push(field);
    }

    SchemaConversion {
        schema: Arc::new(Schema::new(fields)),
        diagnostics,
    }
}

/// [`convert_schema`], logging diagnostics through `tracing`.
pub fn columns_to_arrow_schema(
    columns: &[FieldSchema],
    partition_columns: &[FieldSchema],
) -> SchemaRef {
    let conversion = convert_schema(columns, partition_columns);
    for diagnostic in &conversion.diagnostics {
        tracing::warn!(
            column = %diagnostic.column,
            type_text = %diagnostic.diagnostic.type_text,
            "{}",
            diagnostic.diagnostic.message
        );
    }
    conversion.schema
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dtype(text: &str) -> DataType {
        let parsed = parse_type(text);
        assert!(parsed.is_exact(), "unexpected diagnostics: {:?}", parsed.diagnostics);
        parsed.data_type
    }

    fn list_of(item: DataType) -> DataType {
        DataType::List(Arc::new(Field::new("item", item, true)))
    }

    fn map_of(key: DataType, value: DataType) -> DataType {
        DataType::Map(
            Arc::new(Field::new(
                "entries",
                DataType::Struct(Fields::from(vec![
                    Field::new("key", key, false),
                    Field::new("value", value, true),
                ])),
                false,
            )),
            false,
        )
    }

    #[test]
    fn test_scalar_types() {
        assert_eq!(dtype("BOOLEAN"), DataType::Boolean);
        assert_eq!(dtype("TINYINT"), DataType::Int8);
        assert_eq!(dtype("SMALLINT"), DataType::Int16);
        assert_eq!(dtype("INT"), DataType::Int32);
        assert_eq!(dtype("INTEGER"), DataType::Int32);
        assert_eq!(dtype("BIGINT"), DataType::Int64);
        assert_eq!(dtype("FLOAT"), DataType::Float32);
        assert_eq!(dtype("DOUBLE"), DataType::Float64);
        assert_eq!(dtype("DOUBLE PRECISION"), DataType::Float64);
        assert_eq!(dtype("STRING"), DataType::Utf8);
        assert_eq!(dtype("BINARY"), DataType::Binary);
        assert_eq!(dtype("DATE"), DataType::Date32);
        assert_eq!(
            dtype("TIMESTAMP"),
            DataType::Timestamp(TimeUnit::Microsecond, None)
        );
        assert_eq!(dtype("INTERVAL"), DataType::Duration(TimeUnit::Second));
    }

    #[test]
    fn test_case_insensitive_and_whitespace() {
        assert_eq!(dtype("int"), DataType::Int32);
        assert_eq!(dtype("  BigInt  "), DataType::Int64);
        assert_eq!(dtype("double   precision"), DataType::Float64);
    }

    #[test]
    fn test_sized_strings_drop_length() {
        assert_eq!(dtype("varchar(255)"), DataType::Utf8);
        assert_eq!(dtype("CHAR(10)"), DataType::Utf8);
    }

    #[test]
    fn test_decimal() {
        assert_eq!(dtype("decimal(5,2)"), DataType::Decimal128(5, 2));
        assert_eq!(dtype("decimal"), DataType::Decimal128(10, 0));
        assert_eq!(dtype("numeric(12)"), DataType::Decimal128(12, 0));
        assert_eq!(dtype("DECIMAL( 38 , 10 )"), DataType::Decimal128(38, 10));
        assert_eq!(dtype("decimal<7,3>"), DataType::Decimal128(7, 3));
        assert_eq!(dtype("decimal()"), DataType::Decimal128(10, 0));
        assert_eq!(dtype("decimal(50,4)"), DataType::Decimal256(50, 4));
    }

    #[test]
    fn test_invalid_decimal_degrades() {
        for text in ["decimal(0,0)", "decimal(5,6)", "decimal(x,2)", "decimal(1,2,3)", "decimal(99)"] {
            let parsed = parse_type(text);
            assert_eq!(parsed.data_type, DataType::Null, "{text}");
            assert_eq!(parsed.diagnostics.len(), 1, "{text}");
            assert_eq!(parsed.diagnostics[0].kind, DiagnosticKind::MalformedOptions);
        }
    }

    #[test]
    fn test_array() {
        assert_eq!(dtype("array<int>"), list_of(DataType::Int32));
        assert_eq!(
            dtype("array<array<string>>"),
            list_of(list_of(DataType::Utf8))
        );
    }

    #[test]
    fn test_map() {
        assert_eq!(
            dtype("map<string,int>"),
            map_of(DataType::Utf8, DataType::Int32)
        );
        assert_eq!(
            dtype("map<string, map<int,decimal(5,2)>>"),
            map_of(
                DataType::Utf8,
                map_of(DataType::Int32, DataType::Decimal128(5, 2))
            )
        );
    }

    #[test]
    fn test_struct_keeps_order_and_case() {
        assert_eq!(
            dtype("struct<a:int,b:string>"),
            DataType::Struct(Fields::from(vec![
                Field::new("a", DataType::Int32, true),
                Field::new("b", DataType::Utf8, true),
            ]))
        );
        assert_eq!(
            dtype("STRUCT<CamelCase:int>"),
            DataType::Struct(Fields::from(vec![Field::new(
                "CamelCase",
                DataType::Int32,
                true
            )]))
        );
    }

    #[test]
    fn test_struct_space_separated_and_quoted_names() {
        assert_eq!(
            dtype(r#"struct<"x,y" int, `a b`:string, z bigint>"#),
            DataType::Struct(Fields::from(vec![
                Field::new("x,y", DataType::Int32, true),
                Field::new("a b", DataType::Utf8, true),
                Field::new("z", DataType::Int64, true),
            ]))
        );
    }

    #[test]
    fn test_struct_duplicate_names_preserved() {
        let DataType::Struct(fields) = dtype("struct<a:int,a:string>") else {
            panic!("expected struct");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name(), "a");
        assert_eq!(fields[1].name(), "a");
    }

    #[test]
    fn test_deeply_nested() {
        let expected = map_of(
            DataType::Utf8,
            DataType::Struct(Fields::from(vec![
                Field::new("a", list_of(DataType::Int64), true),
                Field::new("b", DataType::Decimal128(5, 2), true),
            ])),
        );
        assert_eq!(
            dtype("map<string,struct<a:array<bigint>,b:decimal(5,2)>>"),
            expected
        );
    }

    #[test]
    fn test_unknown_type_degrades_to_null() {
        let parsed = parse_type("frobnicate");
        assert_eq!(parsed.data_type, DataType::Null);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].kind, DiagnosticKind::UnsupportedType);
        assert_eq!(parsed.diagnostics[0].type_text, "frobnicate");
    }

    #[test]
    fn test_unparsable_text_degrades_to_null() {
        for text in ["", "   ", "<int>", "!!"] {
            let parsed = parse_type(text);
            assert_eq!(parsed.data_type, DataType::Null, "{text:?}");
            assert_eq!(parsed.diagnostics[0].kind, DiagnosticKind::Unparsable);
        }
    }

    #[test]
    fn test_unknown_nested_type_keeps_structure() {
        let parsed = parse_type("array<uniontype<int,string>>");
        assert_eq!(parsed.data_type, list_of(DataType::Null));
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].type_text, "uniontype<int,string>");
    }

    #[test]
    fn test_malformed_composites_degrade() {
        for text in [
            "map<string>",
            "map<a,b,c>",
            "array",
            "array<>",
            "struct<>",
            "struct<a>",
            "struct<a:>",
            r#"struct<"":int>"#,
        ] {
            let parsed = parse_type(text);
            assert_eq!(parsed.data_type, DataType::Null, "{text}");
            assert_eq!(
                parsed.diagnostics[0].kind,
                DiagnosticKind::MalformedOptions,
                "{text}"
            );
        }
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |levels: usize| {
            format!("{}int{}", "array<".repeat(levels), ">".repeat(levels))
        };

        let mut expected = DataType::Int32;
        for _ in 0..MAX_NESTING_DEPTH - 1 {
            expected = list_of(expected);
        }
        assert_eq!(dtype(&nested(MAX_NESTING_DEPTH - 1)), expected);

        let parsed = parse_type(&nested(3000));
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].kind, DiagnosticKind::MalformedOptions);
        let mut data_type = &parsed.data_type;
        let mut depth = 0;
        while let DataType::List(item) = data_type {
            data_type = item.data_type();
            depth += 1;
        }
        assert_eq!(depth, MAX_NESTING_DEPTH);
        assert_eq!(*data_type, DataType::Null);
    }

    #[test]
    fn test_parse_dtype_returns_type_only() {
        assert_eq!(parse_dtype("array<int>"), list_of(DataType::Int32));
        assert_eq!(parse_dtype("nope"), DataType::Null);
    }

    fn column(name: &str, type_name: &str, comment: Option<&str>) -> FieldSchema {
        FieldSchema {
            name: name.into(),
            type_name: type_name.into(),
            comment: comment.map(Into::into),
        }
    }

    #[test]
    fn test_convert_schema_orders_partitions_last() {
        let columns = vec![
            column("id", "bigint", None),
            column("name", "string", Some("display name")),
        ];
        let partitions = vec![column("ds", "string", None), column("hr", "int", None)];

        let conversion = convert_schema(&columns, &partitions);
        let schema = conversion.schema;
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["id", "name", "ds", "hr"]);
        assert!(schema.fields().iter().all(|f| f.is_nullable()));
        assert_eq!(*schema.field(3).data_type(), DataType::Int32);
        assert!(conversion.diagnostics.is_empty());
    }

    #[test]
    fn test_convert_schema_counts() {
        for (n, m) in [(0, 0), (0, 2), (3, 0), (2, 3)] {
            let columns: Vec<_> = (0..n).map(|i| column(&format!("c{i}"), "int", None)).collect();
            let partitions: Vec<_> = (0..m).map(|i| column(&format!("p{i}"), "string", None)).collect();
            let schema = convert_schema(&columns, &partitions).schema;
            assert_eq!(schema.fields().len(), n + m);
            for (i, field) in schema.fields().iter().enumerate() {
                let expected = if i < n { format!("c{i}") } else { format!("p{}", i - n) };
                assert_eq!(field.name(), &expected);
            }
        }
    }

    #[test]
    fn test_comment_metadata_only_when_non_empty() {
        let (with_comment, _) = convert_field(&column("a", "int", Some("the a column")));
        assert_eq!(
            with_comment.metadata().get(COMMENT_METADATA_KEY).map(String::as_str),
            Some("the a column")
        );

        let (empty_comment, _) = convert_field(&column("a", "int", Some("")));
        assert!(empty_comment.metadata().is_empty());
        assert_eq!(empty_comment, Field::new("a", DataType::Int32, true));

        let (no_comment, _) = convert_field(&column("a", "int", None));
        assert!(no_comment.metadata().is_empty());
    }

    #[test]
    fn test_convert_schema_reports_column_diagnostics() {
        let columns = vec![column("ok", "int", None), column("bad", "geometry", None)];
        let conversion = convert_schema(&columns, &[]);
        assert_eq!(conversion.schema.fields().len(), 2);
        assert_eq!(*conversion.schema.field(1).data_type(), DataType::Null);
        assert_eq!(conversion.diagnostics.len(), 1);
        assert_eq!(conversion.diagnostics[0].column, "bad");
        assert!(conversion.diagnostics[0].to_string().contains("geometry"));
    }

    #[test]
    fn test_empty_column_name_is_reported() {
        let columns = vec![column("", "int", None), column("  ", "string", None)];
        let partitions = vec![column("ds", "string", None)];
        let conversion = convert_schema(&columns, &partitions);
        assert_eq!(conversion.schema.fields().len(), 3);
        assert_eq!(*conversion.schema.field(0).data_type(), DataType::Int32);
        assert_eq!(conversion.diagnostics.len(), 2);
        assert!(conversion
            .diagnostics
            .iter()
            .all(|d| d.diagnostic.kind == DiagnosticKind::EmptyName));
    }

    #[test]
    fn test_columns_to_arrow_schema() {
        let schema = columns_to_arrow_schema(&[column("x", "double", None)], &[]);
        assert_eq!(schema.fields().len(), 1);
        assert_eq!(*schema.field(0).data_type(), DataType::Float64);
    }
}
