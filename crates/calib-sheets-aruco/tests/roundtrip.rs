use calib_sheets_aruco::{
    marker_contours, trace_contours, BitMatrix, Contour, Dictionary, DictionarySet, EdgeMap,
    FillColor,
};
use calib_sheets_core::{Canvas, Rgba, Scene};

struct XorShift(u64);

impl XorShift {
    fn next_bool(&mut self) -> bool {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0 & 1 == 1
    }
}

fn random_dictionary(marker_size: usize, count: usize, seed: u64) -> Dictionary {
    let mut rng = XorShift(seed);
    let markers: Vec<BitMatrix> = (0..count)
        .map(|_| BitMatrix::from_fn(marker_size, |_, _| rng.next_bool()))
        .collect();
    Dictionary::from_bit_matrices("random", marker_size, &markers).expect("dictionary")
}

/// Paint a marker at one point per cell: black square, then contours in order.
fn paint(contours: &[Contour], marker_size: usize, border_bits: usize) -> Scene {
    let side = (marker_size + 2 * border_bits) as f64;
    let offset = border_bits as f64;
    let mut scene = Scene::new(side, side);
    scene.set_color(Rgba::BLACK);
    scene.fill_rect(0.0, 0.0, side, side);
    for contour in contours {
        scene.set_color(match contour.color {
            FillColor::Black => Rgba::BLACK,
            FillColor::White => Rgba::WHITE,
        });
        let (first, rest) = contour.points.split_first().expect("non-empty contour");
        scene.move_to(first[0] as f64 + offset, first[1] as f64 + offset);
        for p in rest {
            scene.line_to(p[0] as f64 + offset, p[1] as f64 + offset);
        }
        scene.close_path();
        scene.fill_path();
    }
    scene
}

#[test]
fn rasterized_contours_reproduce_the_bit_matrix() {
    for marker_size in 4..=7 {
        let dict = random_dictionary(marker_size, 40, 0x9E37_79B9_7F4A_7C15 ^ marker_size as u64);
        for border_bits in 0..=2 {
            let side = marker_size + 2 * border_bits;
            for id in 0..dict.len() {
                let bits = dict.marker_bits(id).expect("decode");
                let contours = marker_contours(&dict, id, border_bits).expect("contours");
                let scene = paint(&contours, marker_size, border_bits);

                for y in 0..side {
                    for x in 0..side {
                        let inner = x >= border_bits
                            && y >= border_bits
                            && x < border_bits + marker_size
                            && y < border_bits + marker_size;
                        let expected = if inner && bits.get(x - border_bits, y - border_bits) {
                            Rgba::WHITE
                        } else {
                            Rgba::BLACK
                        };
                        let got = scene.color_at(x as f64 + 0.5, y as f64 + 0.5);
                        assert_eq!(
                            got,
                            Some(expected),
                            "size={marker_size} border={border_bits} id={id} cell=({x},{y})"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn every_edge_is_walked_exactly_once() {
    for marker_size in 4..=7 {
        let dict = random_dictionary(marker_size, 25, 0xDEAD_BEEF + marker_size as u64);
        for border_bits in 0..=2 {
            for id in 0..dict.len() {
                let bits = dict.marker_bits(id).expect("decode").bordered(border_bits);
                let mut edges = EdgeMap::build(&bits);
                let initial = edges.count();
                let contours = trace_contours(&mut edges, &bits);

                let walked: usize = contours.iter().map(Contour::edge_count).sum();
                assert_eq!(walked, initial);
                assert_eq!(edges.count(), 0);

                let mut seen = std::collections::HashSet::new();
                for c in &contours {
                    for w in c.points.windows(2) {
                        let key = if w[0] < w[1] { (w[0], w[1]) } else { (w[1], w[0]) };
                        assert!(seen.insert(key), "edge {key:?} walked twice");
                    }
                }
            }
        }
    }
}

#[test]
fn cloned_edge_maps_trace_identically() {
    let dict = random_dictionary(6, 5, 42);
    let bits = dict.marker_bits(3).expect("decode").bordered(1);
    let pristine = EdgeMap::build(&bits);

    let mut first = pristine.clone();
    let mut second = pristine.clone();
    assert_eq!(
        trace_contours(&mut first, &bits),
        trace_contours(&mut second, &bits)
    );
    assert!(pristine.count() > 0);
}

#[test]
fn dictionary_table_survives_disk_round_trip() {
    let mut set = DictionarySet::new();
    set.insert(random_dictionary(5, 3, 7));
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("dicts.json");
    set.write_json(&path).expect("write");

    let loaded = DictionarySet::load_json(&path).expect("load");
    assert_eq!(loaded, set);
}
