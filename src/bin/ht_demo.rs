//! Replays a short session against a ten-bucket table: eleven inserts
//! (enough to trigger one growth), a dump, a delete and a final dump.

use chained_hashtable::{Table, TableError};

fn main() -> Result<(), TableError> {
    let mut table = Table::new(10)?;

    let inserts = [
        ("Maxwell", 17),
        ("llewxaM", 18),
        ("axwellM", 19),
        ("a", 19),
        ("b", 19),
        ("c", 19),
        ("d", 19),
        ("e", 19),
        ("f", 19),
        ("g", 19),
        ("h", 19),
    ];
    for (key, value) in inserts {
        table.set(key, value)?;
    }

    table.print();

    let status = match table.del("Maxwell") {
        Ok(_) => 0,
        Err(e) => e.status(),
    };
    println!("del status: {status}");

    table.print();
    table.cleanup();
    Ok(())
}
