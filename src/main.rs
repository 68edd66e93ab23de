use fmp4box::Container;

fn main() {
    tracing_subscriber::fmt::init();

    let path = std::env::args().nth(1).unwrap();
    let mmap = unsafe { memmap2::Mmap::map(&std::fs::File::open(path).unwrap()) }.unwrap();

    let mut root = Container::new(b"file").unwrap();
    let tracks = root.parse(&mmap).unwrap();
    for track in &tracks {
        println!("{} {}", track.kind, track.codec);
    }
    println!("{root}");
}
