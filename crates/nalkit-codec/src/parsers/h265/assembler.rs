//! 码流重组.
//!
//! 用改写后的 NAL 单元替换原码流中的对应区间, 起始码、前导零与尾随零保持原样.

use std::collections::BTreeMap;

use nalkit_core::{NalError, NalResult};

use super::scanner::NalUnitRange;

/// 按下标替换 NAL 单元 (头部 + 负载), 其余字节原样复制
///
/// 替换数据必须与原单元等长, 因此输出与输入长度相同.
pub fn assemble(
    original: &[u8],
    ranges: &[NalUnitRange],
    replacements: &BTreeMap<usize, Vec<u8>>,
) -> NalResult<Vec<u8>> {
    for (&index, bytes) in replacements {
        let range = ranges
            .get(index)
            .ok_or_else(|| NalError::InvalidArgument(format!("NAL 单元 #{index} 不存在")))?;
        if range.payload_end > original.len() || range.header_offset > range.payload_end {
            return Err(NalError::InvalidArgument(format!(
                "NAL 单元 #{index} 的范围超出码流"
            )));
        }
        if bytes.len() != range.nal_len() {
            return Err(NalError::ReplacementLengthMismatch {
                index,
                expected: range.nal_len(),
                actual: bytes.len(),
            });
        }
    }

    let mut out = original.to_vec();
    for (&index, bytes) in replacements {
        let range = &ranges[index];
        out[range.header_offset..range.payload_end].copy_from_slice(bytes);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::h265::scanner::scan;

    fn stream() -> Vec<u8> {
        vec![
            0, 0, 0, 1, 0x40, 0x01, 0x0C, 0x01, // VPS
            0, 0, 1, 0x46, 0x01, 0x50, // AUD
            0, 0, 1, 0x48, 0x01, // EOS
            0, 0,
        ]
    }

    #[test]
    fn test_assemble_无替换() {
        let data = stream();
        let ranges: Vec<_> = scan(&data).collect();
        let out = assemble(&data, &ranges, &BTreeMap::new()).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_assemble_替换单元() {
        let data = stream();
        let ranges: Vec<_> = scan(&data).collect();
        let mut replacements = BTreeMap::new();
        replacements.insert(1, vec![0x46, 0x01, 0x30]);
        let out = assemble(&data, &ranges, &replacements).unwrap();

        assert_eq!(out.len(), data.len());
        assert_eq!(&out[..11], &data[..11]);
        assert_eq!(&out[11..14], &[0x46, 0x01, 0x30]);
        assert_eq!(&out[14..], &data[14..]);
    }

    #[test]
    fn test_assemble_长度不符与越界() {
        let data = stream();
        let ranges: Vec<_> = scan(&data).collect();

        let mut replacements = BTreeMap::new();
        replacements.insert(0, vec![0x40, 0x01]);
        assert_eq!(
            assemble(&data, &ranges, &replacements),
            Err(NalError::ReplacementLengthMismatch {
                index: 0,
                expected: 4,
                actual: 2,
            })
        );

        let mut replacements = BTreeMap::new();
        replacements.insert(3, vec![0x48, 0x01]);
        assert!(matches!(
            assemble(&data, &ranges, &replacements),
            Err(NalError::InvalidArgument(_))
        ));
    }
}
