//! `--set` 参数解析与改写执行.

use std::collections::BTreeMap;

use anyhow::{Context, anyhow, bail};
use log::info;
use nalkit_codec::parsers::h265::{
    FieldEdit, NalUnitReport, NalUnitScanner, apply_edits, rebuild_stream,
};

/// 一个 `--set <nal>:<field>=<value>` 请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSpec {
    pub nal_index: usize,
    pub edit: FieldEdit,
}

/// 解析整数, 支持 `0x` 前缀与负数
///
/// 符号只允许出现在最前面一次.
fn parse_value(text: &str) -> anyhow::Result<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (radix, body) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    if body.starts_with(['-', '+']) {
        bail!("无效的数值: {text}");
    }
    let magnitude =
        i64::from_str_radix(body, radix).with_context(|| format!("无效的数值: {text}"))?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// 解析 `<nal>:<field>=<value>`
pub fn parse_edit_spec(text: &str) -> anyhow::Result<EditSpec> {
    let (index, rest) = text
        .split_once(':')
        .ok_or_else(|| anyhow!("格式应为 <nal>:<field>=<value>: {text}"))?;
    let (name, value) = rest
        .split_once('=')
        .ok_or_else(|| anyhow!("格式应为 <nal>:<field>=<value>: {text}"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("字段名为空: {text}");
    }
    let nal_index = index
        .trim()
        .parse::<usize>()
        .with_context(|| format!("无效的 NAL 下标: {index}"))?;
    Ok(EditSpec {
        nal_index,
        edit: FieldEdit::new(name, parse_value(value.trim())?),
    })
}

/// 按 NAL 下标分组应用所有改写, 返回重建后的码流
///
/// 任意一个改写失败则整体失败.
pub fn apply_all(
    data: &[u8],
    reports: &[NalUnitReport],
    specs: &[EditSpec],
) -> anyhow::Result<Vec<u8>> {
    let mut grouped: BTreeMap<usize, Vec<FieldEdit>> = BTreeMap::new();
    for spec in specs {
        grouped
            .entry(spec.nal_index)
            .or_default()
            .push(spec.edit.clone());
    }

    let mut replacements = BTreeMap::new();
    for (index, edits) in grouped {
        let report = reports
            .get(index)
            .ok_or_else(|| anyhow!("NAL #{index} 不存在 (共 {} 个)", reports.len()))?;
        let unit = report
            .result
            .as_ref()
            .map_err(|e| anyhow!("NAL #{index} 无法解析: {e}"))?;
        let nal = apply_edits(data, &unit.range, &unit.fields, &edits)
            .with_context(|| format!("NAL #{index} 改写失败"))?;
        info!("NAL #{index}: 应用 {} 个改写", edits.len());
        replacements.insert(index, nal);
    }

    let ranges: Vec<_> = NalUnitScanner::new(data).collect();
    Ok(rebuild_stream(data, &ranges, &replacements)?)
}
