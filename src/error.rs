//! error: типизированные ошибки ядра и структурированные предупреждения.
//!
//! Ядро (page/record/lob/scan) возвращает `Result<T, Error>`, чтобы вызывающий
//! мог различать класс проблемы (`Error::kind()`); CLI поверх этого использует anyhow.
//!
//! Предупреждения (`Warning`) не прерывают обход: они копятся в `Diagnostics`,
//! возвращаются вместе с результатом и дублируются в `log::warn!`.

use std::fmt;
use std::io;

use log::warn;
use serde::Serialize;

/// Result type alias for carving operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Класс ошибки (для тестов и решения "продолжать или нет" на уровне CLI).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Короткое чтение / seek за конец файла / усечённый буфер.
    Io,
    /// Тип страницы или записи не тот, что ожидал вызывающий.
    FormatMismatch,
    /// Слоты закончились, цикл в дереве, смещение вне страницы.
    Structure,
}

#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O error from the underlying source.
    Io(io::Error),
    /// Буфер короче, чем требует декодируемая структура.
    Truncated {
        what: &'static str,
        need: usize,
        have: usize,
    },
    /// Decoded type differs from the expected one.
    FormatMismatch {
        page: u32,
        slot: Option<u16>,
        expected: &'static str,
        actual: u16,
    },
    /// Malformed on-disk structure.
    Structure { page: u32, detail: String },
    /// Сборка LOB прервана: часть байт уже записана в выход.
    /// `recovered`: собранный префикс, если сборка шла в память.
    Partial {
        written: u64,
        recovered: Option<Vec<u8>>,
        diagnostics: Diagnostics,
        source: Box<Error>,
    },
    /// Ошибка обхода, до которой уже накопились предупреждения.
    WithDiagnostics {
        diagnostics: Diagnostics,
        source: Box<Error>,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::Truncated { .. } => ErrorKind::Io,
            Error::FormatMismatch { .. } => ErrorKind::FormatMismatch,
            Error::Structure { .. } => ErrorKind::Structure,
            Error::Partial { source, .. } | Error::WithDiagnostics { source, .. } => {
                source.kind()
            }
        }
    }

    /// Предупреждения, собранные до ошибки.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Error::Partial { diagnostics, .. } | Error::WithDiagnostics { diagnostics, .. } => {
                Some(diagnostics)
            }
            _ => None,
        }
    }

    /// Байты, собранные в память до ошибки.
    pub fn recovered(&self) -> Option<&[u8]> {
        match self {
            Error::Partial {
                recovered: Some(b), ..
            } => Some(b.as_slice()),
            _ => None,
        }
    }

    /// Исходная причина без обёрток Partial/WithDiagnostics.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Partial { source, .. } | Error::WithDiagnostics { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    pub(crate) fn with_diagnostics(self, diagnostics: Diagnostics) -> Self {
        if diagnostics.is_empty() {
            return self;
        }
        Error::WithDiagnostics {
            diagnostics,
            source: Box::new(self),
        }
    }

    pub(crate) fn structure(page: u32, detail: impl Into<String>) -> Self {
        Error::Structure {
            page,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::Truncated { what, need, have } => {
                write!(f, "truncated {what}: need {need} bytes, have {have}")
            }
            Error::FormatMismatch {
                page,
                slot: Some(slot),
                expected,
                actual,
            } => write!(
                f,
                "format mismatch at page {page} slot {slot}: \
                 expected {expected}, found type {actual}"
            ),
            Error::FormatMismatch {
                page,
                slot: None,
                expected,
                actual,
            } => write!(
                f,
                "format mismatch at page {page}: expected {expected}, found type {actual}"
            ),
            Error::Structure { page, detail } => {
                write!(f, "structure error at page {page}: {detail}")
            }
            Error::Partial {
                written, source, ..
            } => write!(f, "{source} (after {written} bytes written)"),
            Error::WithDiagnostics {
                diagnostics,
                source,
            } => write!(f, "{source} ({} warning(s) before failure)", diagnostics.len()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            // Display обёрток уже включает source, в цепочке его не повторяем.
            Error::Partial { source, .. } | Error::WithDiagnostics { source, .. } => {
                std::error::Error::source(source.as_ref())
            }
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

// ---------------- warnings ----------------

/// Неожиданное, но переживаемое значение.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// fileId != 1 в ссылке LOB-дерева.
    IrregularFileId { file_id: u16 },
    /// Ненулевой slot в ссылке корня LARGE_ROOT.
    IrregularRootSlot { slot: u16 },
    /// maxlinks внутреннего узла отличается от стандартного.
    IrregularMaxLinks { expected: u16, found: u16 },
    /// Лист дерева указывает не на DATA-запись.
    UnexpectedLeafType { found: u16 },
    /// Элемент slot array не сопоставлен ни одной последовательной записи.
    UnmatchedSlotEntry { offset: u16 },
    /// Ненулевой slot в ссылке между INTERNAL узлами.
    IrregularLinkSlot { slot: u16 },
    /// Хвост файла короче страницы.
    TrailingBytes { bytes: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub page: u32,
    pub slot: Option<u16>,
    #[serde(flatten)]
    pub kind: WarningKind,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            Some(s) => write!(f, "page {} slot {}: ", self.page, s)?,
            None => write!(f, "page {}: ", self.page)?,
        }
        match &self.kind {
            WarningKind::IrregularFileId { file_id } => write!(f, "irregular fileId {file_id}"),
            WarningKind::IrregularRootSlot { slot } => write!(f, "irregular root link slot {slot}"),
            WarningKind::IrregularLinkSlot { slot } => {
                write!(f, "irregular internal link slot {slot}")
            }
            WarningKind::IrregularMaxLinks { expected, found } => {
                write!(f, "irregular maxlinks {found} (expected {expected})")
            }
            WarningKind::UnexpectedLeafType { found } => {
                write!(f, "leaf record type {found} is not DATA")
            }
            WarningKind::UnmatchedSlotEntry { offset } => {
                write!(f, "slot array entry {offset} matches no record")
            }
            WarningKind::TrailingBytes { bytes } => {
                write!(f, "{bytes} trailing bytes do not form a full page")
            }
        }
    }
}

/// Накопитель предупреждений одного прохода.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Warning>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, page: u32, slot: Option<u16>, kind: WarningKind) {
        let w = Warning { page, slot, kind };
        warn!("{}", w);
        self.0.push(w);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
