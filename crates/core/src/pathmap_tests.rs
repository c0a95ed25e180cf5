use super::*;
use proptest::prelude::*;

const HOST: &str = "/home/u/p";
const CONTAINER: &str = "/workspace";

#[test]
fn maps_relative_path_under_root() {
    let out = host_to_container("src/x.ts", HOST, CONTAINER);
    assert_eq!(out, PathBuf::from("/workspace/src/x.ts"));
}

#[test]
fn maps_absolute_path_inside_root() {
    let out = host_to_container("/home/u/p/src/x.ts", HOST, CONTAINER);
    assert_eq!(out, PathBuf::from("/workspace/src/x.ts"));
}

#[test]
fn root_itself_maps_to_container_root() {
    let out = host_to_container("/home/u/p", HOST, CONTAINER);
    assert_eq!(out, PathBuf::from("/workspace"));
}

#[test]
fn escaping_path_clamps_to_root() {
    let out = host_to_container("/etc/passwd", HOST, CONTAINER);
    assert_eq!(out, PathBuf::from("/workspace"));
}

#[test]
fn dot_dot_escape_clamps_to_root() {
    let out = host_to_container("../../etc/passwd", HOST, CONTAINER);
    assert_eq!(out, PathBuf::from("/workspace"));
}

#[test]
fn empty_input_clamps_to_root() {
    let out = host_to_container("", HOST, CONTAINER);
    assert_eq!(out, PathBuf::from("/workspace"));
}

#[test]
fn empty_roots_fall_back_to_slash() {
    let out = host_to_container("whatever", "", "");
    assert_eq!(out, PathBuf::from("/"));
}

#[test]
fn container_to_host_is_symmetric() {
    let out = container_to_host("/workspace/src/x.ts", HOST, CONTAINER);
    assert_eq!(out, PathBuf::from("/home/u/p/src/x.ts"));
}

#[test]
fn container_to_host_preserves_nested_subpath() {
    let out = container_to_host("/workspace/a/b/c/d.txt", HOST, CONTAINER);
    assert_eq!(out, PathBuf::from("/home/u/p/a/b/c/d.txt"));
}

#[test]
fn is_within_root_accepts_the_root_itself() {
    assert!(is_within_root(HOST, HOST));
}

#[test]
fn is_within_root_accepts_a_nested_path() {
    assert!(is_within_root("/home/u/p/src/x.ts", HOST));
}

#[test]
fn is_within_root_rejects_an_escaping_absolute_path() {
    assert!(!is_within_root("/etc/passwd", HOST));
}

#[test]
fn is_within_root_rejects_a_dot_dot_escape() {
    assert!(!is_within_root("../../etc/passwd", HOST));
}

fn path_component() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,8}"
}

proptest! {
    /// For all host paths and roots, `hostToContainer` returns a path that
    /// is either `C` itself or has `C` as a proper directory prefix.
    #[test]
    fn host_to_container_stays_within_container_root(
        segments in proptest::collection::vec(path_component(), 0..5),
    ) {
        let input = segments.join("/");
        let out = host_to_container(&input, HOST, CONTAINER);
        let container_root = Path::new(CONTAINER);
        prop_assert!(out == container_root || out.starts_with(container_root));
    }

    /// `containerToHost` is the left inverse of `hostToContainer` on the
    /// image of paths strictly inside `H`.
    #[test]
    fn container_to_host_inverts_host_to_container(
        segments in proptest::collection::vec(path_component(), 1..5),
    ) {
        let relative = segments.join("/");
        let mapped = host_to_container(&relative, HOST, CONTAINER);
        let mapped_str = mapped.to_string_lossy().to_string();
        let back = container_to_host(&mapped_str, HOST, CONTAINER);
        prop_assert_eq!(back, PathBuf::from(HOST).join(&relative));
    }
}
