pub const GO_EXTENSION: &str = "go";

pub const TEST_FILE_SUFFIX: &str = "_test.go";

pub const GO_MOD: &str = "go.mod";

/// Directories never entered by a `...` pattern.
pub const EXCLUDED_DIRS: &[&str] = &["testdata", "vendor"];

pub const RECURSIVE_SUFFIX: &str = "...";

pub const DEFAULT_PATTERN: &str = "./.";

pub const EXTERNAL_TEST_SUFFIX: &str = "_test";

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub const KNOWN_OS: &[&str] = &[
    "aix",
    "android",
    "darwin",
    "dragonfly",
    "freebsd",
    "hurd",
    "illumos",
    "ios",
    "js",
    "linux",
    "nacl",
    "netbsd",
    "openbsd",
    "plan9",
    "solaris",
    "wasip1",
    "windows",
    "zos",
];

pub const UNIX_OS: &[&str] = &[
    "aix",
    "android",
    "darwin",
    "dragonfly",
    "freebsd",
    "hurd",
    "illumos",
    "ios",
    "linux",
    "netbsd",
    "openbsd",
    "solaris",
];

pub const KNOWN_ARCH: &[&str] = &[
    "386",
    "amd64",
    "amd64p32",
    "arm",
    "arm64",
    "arm64be",
    "armbe",
    "loong64",
    "mips",
    "mips64",
    "mips64le",
    "mips64p32",
    "mips64p32le",
    "mipsle",
    "ppc",
    "ppc64",
    "ppc64le",
    "riscv",
    "riscv64",
    "s390",
    "s390x",
    "sparc",
    "sparc64",
    "wasm",
];

/// Always-satisfied tags besides the target platform and `go1.N`.
pub const DEFAULT_TAGS: &[&str] = &["gc", "cgo"];
