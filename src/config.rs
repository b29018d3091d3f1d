//! The resolved benchmark configuration handed to the executor.

use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_NUM_FILES: u32 = 4;
pub const DEFAULT_FILE_SIZE: u64 = 128;
pub const DEFAULT_BENCHMARK_DIR: &str = "/benchmarks/TestAlluxioIO";

/// What the benchmark is asked to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestMode {
    Write,
    Read,
    Clean,
    /// Reserved. No command selects it yet.
    #[allow(dead_code)]
    Append,
    /// Reserved. No command selects it yet.
    #[allow(dead_code)]
    Truncate,
    /// Initial value before a command is chosen. Never returned by the resolver.
    Undefined,
}

impl TestMode {
    /// Whether the executor knows how to run this mode.
    pub fn is_runnable(self) -> bool {
        matches!(self, TestMode::Write | TestMode::Read | TestMode::Clean)
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestMode::Write => "write",
            TestMode::Read => "read",
            TestMode::Clean => "clean",
            TestMode::Append => "append",
            TestMode::Truncate => "truncate",
            TestMode::Undefined => "undefined",
        };
        f.write_str(name)
    }
}

/// A closed set of values an option accepts, matched by exact name.
pub trait Choice: Copy + 'static {
    /// Every variant, in declaration order.
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == name)
    }

    /// Comma separated list of the accepted names.
    fn names() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

macro_rules! choice {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl Choice for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice!(
    /// How reads interact with the cache.
    ReadBehavior {
        CachePromote => "CACHE_PROMOTE",
        Cache => "CACHE",
        NoCache => "NO_CACHE",
    }
);

choice!(
    /// How writes interact with the cache and the under storage.
    WriteBehavior {
        MustCache => "MUST_CACHE",
        CacheThrough => "CACHE_THROUGH",
        Through => "THROUGH",
        AsyncThrough => "ASYNC_THROUGH",
    }
);

choice!(
    /// Codec applied to the file contents.
    Compression {
        Lz4 => "lz4",
        Snappy => "snappy",
        Gzip => "gzip",
        Bzip2 => "bzip2",
    }
);

/// Everything the executor needs to run one benchmark.
///
/// Starts from [`TestConfig::default`] and is overridden option by option while resolving the
/// command line. Once handed out it is never changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestConfig {
    mode: TestMode,
    num_files: u32,
    /// In bytes.
    file_size: u64,
    benchmark_dir: PathBuf,
    read_behavior: ReadBehavior,
    write_behavior: WriteBehavior,
    compression: Option<Compression>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            mode: TestMode::Undefined,
            num_files: DEFAULT_NUM_FILES,
            file_size: DEFAULT_FILE_SIZE,
            benchmark_dir: PathBuf::from(DEFAULT_BENCHMARK_DIR),
            read_behavior: ReadBehavior::CachePromote,
            write_behavior: WriteBehavior::MustCache,
            compression: None,
        }
    }
}

impl TestConfig {
    pub fn mode(&self) -> TestMode {
        self.mode
    }

    pub fn num_files(&self) -> u32 {
        self.num_files
    }

    /// The size of every file, in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn benchmark_dir(&self) -> &Path {
        &self.benchmark_dir
    }

    pub fn read_behavior(&self) -> ReadBehavior {
        self.read_behavior
    }

    pub fn write_behavior(&self) -> WriteBehavior {
        self.write_behavior
    }

    pub fn compression(&self) -> Option<Compression> {
        self.compression
    }

    pub(crate) fn with_mode(mut self, mode: TestMode) -> Self {
        self.mode = mode;
        self
    }

    pub(crate) fn with_num_files(mut self, num_files: u32) -> Self {
        self.num_files = num_files;
        self
    }

    pub(crate) fn with_file_size(mut self, file_size: u64) -> Self {
        self.file_size = file_size;
        self
    }

    pub(crate) fn with_benchmark_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.benchmark_dir = dir.into();
        self
    }

    pub(crate) fn with_read_behavior(mut self, behavior: ReadBehavior) -> Self {
        self.read_behavior = behavior;
        self
    }

    pub(crate) fn with_write_behavior(mut self, behavior: WriteBehavior) -> Self {
        self.write_behavior = behavior;
        self
    }

    pub(crate) fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = Some(compression);
        self
    }
}

impl fmt::Display for TestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mode={} files={} size={}B dir={} write={} read={} compression={}",
            self.mode,
            self.num_files,
            self.file_size,
            self.benchmark_dir.display(),
            self.write_behavior,
            self.read_behavior,
            self.compression.map_or("none", |c| c.as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TestConfig::default();
        assert_eq!(config.mode(), TestMode::Undefined);
        assert_eq!(config.num_files(), 4);
        assert_eq!(config.file_size(), 128);
        assert_eq!(config.benchmark_dir(), Path::new("/benchmarks/TestAlluxioIO"));
        assert_eq!(config.read_behavior(), ReadBehavior::CachePromote);
        assert_eq!(config.write_behavior(), WriteBehavior::MustCache);
        assert_eq!(config.compression(), None);
    }

    #[test]
    fn choice_names_are_exact() {
        assert_eq!(WriteBehavior::from_name("ASYNC_THROUGH"), Some(WriteBehavior::AsyncThrough));
        assert_eq!(WriteBehavior::from_name("async_through"), None);
        assert_eq!(ReadBehavior::from_name("NO_CACHE"), Some(ReadBehavior::NoCache));
        assert_eq!(Compression::from_name("bzip2"), Some(Compression::Bzip2));
        assert_eq!(Compression::from_name("LZ4"), None);
        assert_eq!(Compression::names(), "lz4, snappy, gzip, bzip2");
    }

    #[test]
    fn only_wired_modes_are_runnable() {
        assert!(TestMode::Write.is_runnable());
        assert!(TestMode::Clean.is_runnable());
        assert!(!TestMode::Append.is_runnable());
        assert!(!TestMode::Truncate.is_runnable());
        assert!(!TestMode::Undefined.is_runnable());
    }

    #[test]
    fn summary_line() {
        let config = TestConfig::default()
            .with_mode(TestMode::Read)
            .with_benchmark_dir("/tmp/x")
            .with_compression(Compression::Gzip);
        assert_eq!(
            config.to_string(),
            "mode=read files=4 size=128B dir=/tmp/x write=MUST_CACHE read=CACHE_PROMOTE compression=gzip"
        );
    }
}
