//! Built-in palettes. Each entry is `[r, g, b]`; order matters because
//! nearest-color ties go to the earliest entry.

pub const GAMEBOY: [[u8; 3]; 4] = [[15, 56, 15], [48, 98, 48], [139, 172, 15], [155, 188, 15]];

pub const NES: [[u8; 3]; 24] = [
    [0, 0, 0],
    [252, 252, 252],
    [188, 188, 188],
    [124, 124, 124],
    [164, 228, 252],
    [60, 188, 252],
    [0, 120, 248],
    [0, 0, 188],
    [184, 248, 216],
    [88, 216, 132],
    [0, 168, 68],
    [0, 104, 56],
    [248, 216, 120],
    [248, 184, 0],
    [172, 124, 0],
    [100, 76, 0],
    [248, 184, 184],
    [248, 120, 88],
    [216, 40, 0],
    [136, 20, 0],
    [216, 184, 248],
    [152, 120, 248],
    [104, 68, 252],
    [68, 40, 188],
];

pub const GRAYSCALE: [[u8; 3]; 8] = [
    [0, 0, 0],
    [32, 32, 32],
    [64, 64, 64],
    [96, 96, 96],
    [128, 128, 128],
    [160, 160, 160],
    [192, 192, 192],
    [224, 224, 224],
];

pub const RETRO: [[u8; 3]; 16] = [
    [0, 0, 0],
    [255, 255, 255],
    [255, 0, 0],
    [0, 255, 255],
    [128, 0, 128],
    [0, 255, 0],
    [0, 0, 255],
    [255, 255, 0],
    [255, 128, 0],
    [128, 64, 0],
    [255, 128, 128],
    [64, 64, 64],
    [128, 128, 128],
    [128, 255, 128],
    [128, 128, 255],
    [192, 192, 192],
];

pub const BUILTIN: [(&str, &[[u8; 3]]); 4] = [
    ("gameboy", &GAMEBOY),
    ("nes", &NES),
    ("grayscale", &GRAYSCALE),
    ("retro", &RETRO),
];
