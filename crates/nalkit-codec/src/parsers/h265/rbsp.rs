//! 防竞争字节 (emulation_prevention_three_byte) 处理.
//!
//! NAL 负载中任何 `00 00 0x` (x <= 3) 序列都由编码器插入 `0x03` 打断,
//! 以免出现伪起始码. 解析前需移除这些字节得到 RBSP, 改写后再重新插入.

/// 防竞争字节
pub const EMULATION_PREVENTION_BYTE: u8 = 0x03;

/// 移除防竞争字节, 得到 RBSP
///
/// 只有紧跟在两个 0x00 之后的 0x03 才会被移除.
pub fn strip(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut zeros = 0usize;
    for &byte in raw {
        if zeros >= 2 && byte == EMULATION_PREVENTION_BYTE {
            zeros = 0;
            continue;
        }
        out.push(byte);
        zeros = if byte == 0 { zeros + 1 } else { 0 };
    }
    out
}

/// 插入防竞争字节, 得到可直接放入码流的 NAL 负载
///
/// 两个 0x00 之后若紧跟 <= 0x03 的字节, 在其前插入 0x03;
/// RBSP 以两个 0x00 结尾时在末尾追加 0x03.
pub fn insert(rbsp: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rbsp.len() + rbsp.len() / 64 + 1);
    let mut zeros = 0usize;
    for &byte in rbsp {
        if zeros >= 2 && byte <= EMULATION_PREVENTION_BYTE {
            out.push(EMULATION_PREVENTION_BYTE);
            zeros = 0;
        }
        out.push(byte);
        zeros = if byte == 0 { zeros + 1 } else { 0 };
    }
    if zeros >= 2 {
        out.push(EMULATION_PREVENTION_BYTE);
    }
    out
}
