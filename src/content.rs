//! Filler content for generated documents.
//!
//! Bodies are built by repeating one fixed markdown block ([`FILLER_UNIT`],
//! roughly 1 kB) `size_kb` times. The resulting length is always an exact
//! multiple of the unit length, so "size in kB" is an approximation rather
//! than a byte count. The block mixes headings, emphasis, a list, and a link
//! so a markdown renderer has something to chew on.

/// One unit of filler text, roughly 1 kB of markdown.
pub const FILLER_UNIT: &str = r#"
## Vespera longa sub arbore ventus

Lorem filler *ipsum* dolor sit amet, **consectetur** adipiscing elit, sed do
eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim
veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea.

- Ripae silentes
- Flumina tarda sub ponte vetusto
- Nubes et umbrae
- Litora longa maris sine fine manentia
- Saxa cadunt lente per valles frigidas
- Folia sicca et venti

Duis aute irure dolor in reprehenderit in voluptate velit esse cillum dolore
eu fugiat nulla pariatur. Excepteur sint occaecat cupidatat non proident, sunt
in culpa qui officia deserunt mollit anim id est laborum. Curabitur **pretium
tincidunt** lacus, nulla gravida orci a odio; nullam varius turpis et commodo
pharetra, est eros bibendum elit, nec luctus magna felis sollicitudin mauris.

## Aurora tacita super montes

Integer in mauris eu nibh euismod gravida, duis ac tellus et risus [vulputate
vehicula](https://example.com/vulputate). Donec lobortis risus a elit, etiam
tempor ut ullamcorper.
"#;

/// Build a body of `size_kb` filler units.
pub fn generate(size_kb: usize) -> String {
    FILLER_UNIT.repeat(size_kb)
}

/// Assemble a full document: front matter followed by a `size_kb` body.
pub fn document(front_matter: &str, size_kb: usize) -> String {
    let mut doc = String::with_capacity(front_matter.len() + FILLER_UNIT.len() * size_kb);
    doc.push_str(front_matter);
    doc.push_str(&generate(size_kb));
    doc
}
