//! Builtin worksheet exercises.
//!
//! Four self-contained exercises covering the progression the course
//! worksheets follow: block locality, direct-mapped conflicts, two-way LRU
//! eviction, and write-back behavior. Each carries its own geometry, memory
//! image, and answer key, so the sequences really produce the hits and
//! misses they teach.

use crate::config::{Geometry, WritePolicy};
use crate::exercise::{Exercise, MemoryCell, Step};

/// All builtin exercises, in teaching order.
pub fn all() -> Vec<Exercise> {
    vec![
        simple_direct_mapped(),
        part2_direct_mapped(),
        part3_two_way_lru(),
        write_operations(),
    ]
}

/// Looks up a builtin exercise by its name.
pub fn find(name: &str) -> Option<Exercise> {
    all().into_iter().find(|exercise| exercise.name == name)
}

fn cell(addr: u32, value: u32) -> MemoryCell {
    MemoryCell { addr, value }
}

/// A first walk through block locality in a tiny direct-mapped cache.
fn simple_direct_mapped() -> Exercise {
    Exercise {
        name: "simple-direct-mapped".to_owned(),
        description: "Simple direct-mapped warm-up: blocks and reuse".to_owned(),
        geometry: Geometry {
            num_slots: 8,
            block_size_words: 4,
            associativity: 1,
            write_policy: WritePolicy::WriteThrough,
        },
        memory_image: vec![
            cell(0x0010, 100),
            cell(0x0014, 200),
            cell(0x0018, 300),
            cell(0x001C, 400),
            cell(0x0020, 500),
            cell(0x0024, 600),
        ],
        steps: vec![
            Step::read(0x0010, false).with_note("first touch of the 0x0010 block"),
            Step::read(0x0014, true).with_note("same block as 0x0010"),
            Step::read(0x0020, false).with_note("a new block, mapping to a different slot"),
            Step::read(0x0010, true).with_note("the 0x0010 block is still resident"),
        ],
    }
}

/// Worksheet part 2: direct-mapped lookups with 4-word blocks.
fn part2_direct_mapped() -> Exercise {
    Exercise {
        name: "part2-direct-mapped".to_owned(),
        description: "Part 2: direct-mapped cache with 4-word blocks".to_owned(),
        geometry: Geometry {
            num_slots: 256,
            block_size_words: 4,
            associativity: 1,
            write_policy: WritePolicy::WriteThrough,
        },
        memory_image: vec![
            cell(0x26C0, 22),
            cell(0x26C4, 33),
            cell(0x26C8, 44),
            cell(0x26CC, 55),
            cell(0x3520, 66),
            cell(0x3524, 77),
            cell(0x3528, 88),
            cell(0x352C, 99),
            cell(0xBD20, 4444),
            cell(0xBD24, 5555),
            cell(0xBD28, 6666),
            cell(0xBD2C, 7777),
            cell(0x8120, 555),
            cell(0x8124, 666),
            cell(0x8128, 777),
            cell(0x812C, 888),
        ],
        steps: vec![
            Step::read(0xBD28, false).with_note("cold miss; fetches the whole 0xBD20 block"),
            Step::read(0xBD24, true).with_note("same block, brought in by the previous miss"),
            Step::read(0x8128, false).with_note("different slot, first touch"),
        ],
    }
}

/// Worksheet part 3: two-way set-associative lookups with LRU eviction.
fn part3_two_way_lru() -> Exercise {
    Exercise {
        name: "part3-two-way-lru".to_owned(),
        description: "Part 3: two-way set-associative cache with LRU".to_owned(),
        geometry: Geometry {
            num_slots: 256,
            block_size_words: 1,
            associativity: 2,
            write_policy: WritePolicy::WriteThrough,
        },
        memory_image: vec![
            cell(0x3738, 123),
            cell(0x3748, 234),
            cell(0x9238, 345),
            cell(0x92A8, 456),
            cell(0xF038, 567),
            cell(0xF0A8, 678),
            cell(0x30A8, 789),
        ],
        steps: vec![
            Step::read(0x3738, false).with_note("cold miss"),
            Step::read(0xF0A8, false).with_note("cold miss; first way of its set"),
            Step::read(0x92A8, false).with_note("cold miss; second way of the same set"),
            Step::read(0xF0A8, true).with_note("hit; this line becomes most recently used"),
            Step::read(0x30A8, false).with_note("the set is full; evicts 0x92A8, the LRU line"),
            Step::read(0x92A8, false).with_note("miss again, because it was just evicted"),
        ],
    }
}

/// Write hits, write misses, and the write-back deferral.
fn write_operations() -> Exercise {
    Exercise {
        name: "write-operations".to_owned(),
        description: "Write operations under a write-back policy".to_owned(),
        geometry: Geometry {
            num_slots: 256,
            block_size_words: 2,
            associativity: 1,
            write_policy: WritePolicy::WriteBack,
        },
        memory_image: vec![
            cell(0x3000, 1000),
            cell(0x3004, 2000),
            cell(0x4100, 3000),
        ],
        steps: vec![
            Step::read(0x3000, false).with_note("cold miss; fetches the two-word block"),
            Step::write(0x3004, 2500, true)
                .with_note("write hit in the same block; the line turns dirty"),
            Step::read(0x4100, false).with_note("unrelated slot; the dirty line stays put"),
            Step::read(0x3004, true).with_note("reads the cached 2500, not memory's 2000"),
        ],
    }
}
